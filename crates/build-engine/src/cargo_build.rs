//! Cargo invocation
//!
//! Builds the `cargo build` argument vector for one target and runs it with
//! the synthesized environment.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use rust_android_core::{FeatureSelection, Profile};
use rust_android_toolchain::ResolvedEnvironment;

use crate::features::feature_args;
use crate::BuildError;

/// Inputs of the cargo command line
#[derive(Debug, Clone)]
pub struct CargoCommand {
    pub cargo: String,
    pub rustup_channel: String,
    pub verbose: bool,
    pub features: FeatureSelection,
    pub profile: Profile,
    pub target: String,
    /// Host triple, when it could be detected
    pub default_target: Option<String>,
    pub extra_args: Vec<String>,
}

impl CargoCommand {
    /// Full argument vector, program first. The order is fixed so extra
    /// arguments, which come last, can override anything before them.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.cargo.clone()];

        if !self.rustup_channel.is_empty() {
            if self.rustup_channel.starts_with('+') {
                args.push(self.rustup_channel.clone());
            } else {
                args.push(format!("+{}", self.rustup_channel));
            }
        }

        args.push("build".to_string());

        if self.verbose {
            args.push("--verbose".to_string());
        }

        args.extend(feature_args(&self.features));

        if let Some(flag) = self.profile.cargo_flag() {
            args.push(flag.to_string());
        }

        if self.default_target.as_deref() != Some(self.target.as_str()) {
            args.push(format!("--target={}", self.target));
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// A fully resolved subprocess: program, arguments, directory, environment
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub env: ResolvedEnvironment,
}

impl Invocation {
    /// Split a command line (program first) into an invocation
    pub fn new(command_line: Vec<String>, working_dir: PathBuf, env: ResolvedEnvironment) -> Self {
        let mut parts = command_line.into_iter();
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
            working_dir,
            env,
        }
    }

    /// Command line for display
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion with inherited stdout/stderr. The environment is
    /// applied to the child only.
    pub async fn run(&self) -> Result<(), BuildError> {
        info!("Running: {}", self.command_line());
        debug!("Working directory: {:?}", self.working_dir);

        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .envs(self.env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        if !status.success() {
            return Err(BuildError::InvocationFailed {
                program: self.program.clone(),
                status,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_android_core::FeatureSet;

    fn command() -> CargoCommand {
        CargoCommand {
            cargo: "cargo".to_string(),
            rustup_channel: String::new(),
            verbose: false,
            features: FeatureSelection::default(),
            profile: Profile::Debug,
            target: "aarch64-linux-android".to_string(),
            default_target: Some("x86_64-unknown-linux-gnu".to_string()),
            extra_args: Vec::new(),
        }
    }

    #[test]
    fn test_minimal_cross_build() {
        assert_eq!(
            command().args(),
            vec!["cargo", "build", "--target=aarch64-linux-android"]
        );
    }

    #[test]
    fn test_full_ordering() {
        let cmd = CargoCommand {
            rustup_channel: "nightly".to_string(),
            verbose: true,
            features: FeatureSelection::NoDefaultBut(FeatureSet::new(["x", "y"])),
            profile: Profile::Release,
            extra_args: vec!["--locked".to_string(), "-j2".to_string()],
            ..command()
        };

        assert_eq!(
            cmd.args(),
            vec![
                "cargo",
                "+nightly",
                "build",
                "--verbose",
                "--no-default-features",
                "--features",
                "x y",
                "--release",
                "--target=aarch64-linux-android",
                "--locked",
                "-j2",
            ]
        );
    }

    #[test]
    fn test_channel_with_plus_kept() {
        let cmd = CargoCommand {
            rustup_channel: "+1.75.0".to_string(),
            ..command()
        };
        assert_eq!(cmd.args()[1], "+1.75.0");
    }

    #[test]
    fn test_release_flag_only_for_release() {
        let debug = command().args();
        assert!(!debug.iter().any(|a| a == "--release"));

        let release = CargoCommand {
            profile: Profile::Release,
            ..command()
        }
        .args();
        assert_eq!(release.iter().filter(|a| *a == "--release").count(), 1);
    }

    #[test]
    fn test_target_flag_omitted_for_default_triple() {
        let native = CargoCommand {
            target: "x86_64-unknown-linux-gnu".to_string(),
            ..command()
        };
        assert!(!native.args().iter().any(|a| a.starts_with("--target")));

        let undetected = CargoCommand {
            target: "x86_64-unknown-linux-gnu".to_string(),
            default_target: None,
            ..command()
        };
        assert!(undetected
            .args()
            .contains(&"--target=x86_64-unknown-linux-gnu".to_string()));
    }

    #[test]
    fn test_invocation_split() {
        let inv = Invocation::new(command().args(), PathBuf::from("/m"), ResolvedEnvironment::new());
        assert_eq!(inv.program, "cargo");
        assert_eq!(inv.args, vec!["build", "--target=aarch64-linux-android"]);
        assert_eq!(inv.command_line(), "cargo build --target=aarch64-linux-android");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_exit_status() {
        let dir = tempfile::tempdir().unwrap();

        let ok = Invocation::new(
            vec!["sh".to_string(), "-c".to_string(), "test \"$MARKER\" = yes".to_string()],
            dir.path().to_path_buf(),
            {
                let mut env = ResolvedEnvironment::new();
                env.set("MARKER", "yes");
                env
            },
        );
        ok.run().await.unwrap();
        assert!(std::env::var("MARKER").is_err());

        let failing = Invocation::new(
            vec!["sh".to_string(), "-c".to_string(), "exit 4".to_string()],
            dir.path().to_path_buf(),
            ResolvedEnvironment::new(),
        );
        match failing.run().await {
            Err(BuildError::InvocationFailed { program, status }) => {
                assert_eq!(program, "sh");
                assert_eq!(status.code(), Some(4));
            }
            other => panic!("expected invocation failure, got {:?}", other),
        }
    }
}
