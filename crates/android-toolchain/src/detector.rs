//! Default target detection
//!
//! Asks the compiler driver (`rustc --version --verbose`) for the host
//! triple. Failure is not fatal: callers then treat every build as a cross
//! build, which only costs an explicit `--target` and a deeper output path.

use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Pull the value of the `host:` line out of `rustc -vV` output
pub fn parse_host_triple(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.starts_with("host:"))
        .map(|line| line["host:".len()..].trim().to_string())
}

/// Detect the default target triple of `rustc`
pub async fn detect_default_triple(rustc: &str) -> Option<String> {
    let output = Command::new(rustc)
        .args(["--version", "--verbose"])
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .await;

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            warn!(
                "Could not determine default rust target triple. `{} --version --verbose` failed to start: {}",
                rustc, e
            );
            return None;
        }
    };

    if !output.status.success() {
        warn!(
            "Could not determine default rust target triple. `{} --version --verbose` returned {}",
            rustc,
            output.status.code().unwrap_or(-1)
        );
        return None;
    }

    let triple = parse_host_triple(&String::from_utf8_lossy(&output.stdout));
    match triple {
        Some(ref t) => debug!("Default target triple: {}", t),
        None => warn!("`{} --version --verbose` printed no host line", rustc),
    }
    triple
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUSTC_VV: &str = "rustc 1.75.0 (82e1608df 2023-12-21)\n\
        binary: rustc\n\
        commit-hash: 82e1608dfa6e0b5569232559e3d385fea5a93112\n\
        commit-date: 2023-12-21\n\
        host: x86_64-unknown-linux-gnu\n\
        release: 1.75.0\n\
        LLVM version: 17.0.6\n";

    #[test]
    fn test_parse_host_triple() {
        assert_eq!(
            parse_host_triple(RUSTC_VV).as_deref(),
            Some("x86_64-unknown-linux-gnu")
        );
        assert_eq!(parse_host_triple("host:   aarch64-apple-darwin  \n").as_deref(), Some("aarch64-apple-darwin"));
        assert_eq!(parse_host_triple("release: 1.75.0\n"), None);
    }

    #[tokio::test]
    async fn test_missing_driver_is_none() {
        assert_eq!(detect_default_triple("/nonexistent/rustc-for-test").await, None);
    }

    #[cfg(unix)]
    fn fake_driver(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("rustc");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().to_string()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_detects_host_line() {
        let dir = tempfile::tempdir().unwrap();
        let rustc = fake_driver(
            dir.path(),
            "echo 'rustc 1.75.0'\necho 'host: x86_64-unknown-linux-gnu'",
        );

        assert_eq!(
            detect_default_triple(&rustc).await.as_deref(),
            Some("x86_64-unknown-linux-gnu")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let rustc = fake_driver(dir.path(), "echo 'host: x86_64-unknown-linux-gnu'\nexit 3");

        assert_eq!(detect_default_triple(&rustc).await, None);
    }
}
