//! Environment synthesis
//!
//! Produces the variables a cargo invocation needs to cross-compile for one
//! Android target. The result is a plain map applied to that one child
//! process; the calling process's environment is never touched, so builds
//! for different targets can run side by side.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::host::HostPlatform;
use crate::ndk::NdkInstallation;
use crate::registry::ToolchainDescriptor;
use crate::ToolchainError;

/// Variables read by the linker wrapper scripts
pub const WRAPPER_PYTHON_COMMAND: &str = "RUST_ANDROID_GRADLE_PYTHON_COMMAND";
pub const WRAPPER_SCRIPT_PY: &str = "RUST_ANDROID_GRADLE_LINKER_WRAPPER_PY";
pub const WRAPPER_CC: &str = "RUST_ANDROID_GRADLE_CC";
pub const WRAPPER_CC_LINK_ARG: &str = "RUST_ANDROID_GRADLE_CC_LINK_ARG";

/// Location of the linker wrapper scripts staged once per root build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkerWrapper {
    dir: PathBuf,
}

impl LinkerWrapper {
    /// Scripts live in `<root build dir>/linker-wrapper`
    pub fn in_build_dir(root_build_dir: &Path) -> Self {
        Self {
            dir: root_build_dir.join("linker-wrapper"),
        }
    }

    /// `linker-wrapper.bat` on Windows hosts, `linker-wrapper.sh` elsewhere
    pub fn script(&self, host: &HostPlatform) -> PathBuf {
        if host.is_windows() {
            self.dir.join("linker-wrapper.bat")
        } else {
            self.dir.join("linker-wrapper.sh")
        }
    }

    pub fn python_script(&self) -> PathBuf {
        self.dir.join("linker-wrapper.py")
    }
}

/// Variables for one subprocess, fully computed up front
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    vars: BTreeMap<String, String>,
}

impl ResolvedEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Shell export lines, for display
    pub fn shell_exports(&self, host: &HostPlatform) -> String {
        let mut exports = String::new();
        for (key, value) in self.iter() {
            if host.is_windows() {
                exports.push_str(&format!("set {}={}\n", key, value));
            } else {
                exports.push_str(&format!("export {}=\"{}\"\n", key, value));
            }
        }
        exports
    }
}

/// `CARGO_TARGET_<TRIPLE>_LINKER` for a target triple
pub fn cargo_linker_var(target: &str) -> String {
    format!("CARGO_TARGET_{}_LINKER", target.to_uppercase().replace('-', "_"))
}

/// Linker argument handed to the wrapper: soname, optionally with a build id
pub fn link_arg(libname: &str, build_id: bool) -> String {
    let soname = format!("-Wl,-soname,lib{}.so", libname);
    if build_id {
        format!("-Wl,--build-id,{}", soname)
    } else {
        soname
    }
}

/// Builds [`ResolvedEnvironment`]s for a host
#[derive(Debug, Clone)]
pub struct EnvironmentSynthesizer {
    host: HostPlatform,
    linker_wrapper: LinkerWrapper,
    python_command: String,
}

impl EnvironmentSynthesizer {
    pub fn new(host: HostPlatform, linker_wrapper: LinkerWrapper, python_command: impl Into<String>) -> Self {
        Self {
            host,
            linker_wrapper,
            python_command: python_command.into(),
        }
    }

    pub fn host(&self) -> &HostPlatform {
        &self.host
    }

    /// Variables for building `toolchain` against `ndk`. Desktop toolchains
    /// get an empty environment: the host compiler is used as is.
    pub fn synthesize(
        &self,
        toolchain: &ToolchainDescriptor,
        ndk: &NdkInstallation,
        api_level: u32,
        libname: &str,
        build_id: bool,
    ) -> Result<ResolvedEnvironment, ToolchainError> {
        let mut env = ResolvedEnvironment::new();
        if toolchain.is_desktop() {
            return Ok(env);
        }

        let toolchain_dir = ndk.toolchain_dir(&self.host);
        let ndk_version_major = ndk.version_major()?;
        let resolve = |relative: Option<PathBuf>| -> Result<String, ToolchainError> {
            relative
                .map(|p| toolchain_dir.join(p).to_string_lossy().to_string())
                .ok_or_else(|| ToolchainError::UnknownPlatform(toolchain.platform.to_string()))
        };

        let cc = resolve(toolchain.cc(api_level, &self.host))?;
        let cxx = resolve(toolchain.cxx(api_level, &self.host))?;
        let ar = resolve(toolchain.ar(api_level, ndk_version_major))?;

        env.set(
            cargo_linker_var(toolchain.target),
            self.linker_wrapper.script(&self.host).to_string_lossy(),
        );

        // cc-rs build scripts look these up by the exact triple
        env.set(format!("CC_{}", toolchain.target), cc.as_str());
        env.set(format!("CXX_{}", toolchain.target), cxx);
        env.set(format!("AR_{}", toolchain.target), ar);

        // clang-sys
        env.set("CLANG_PATH", cc.as_str());

        env.set(WRAPPER_PYTHON_COMMAND, self.python_command.as_str());
        env.set(WRAPPER_SCRIPT_PY, self.linker_wrapper.python_script().to_string_lossy());
        env.set(WRAPPER_CC, cc);
        env.set(WRAPPER_CC_LINK_ARG, link_arg(libname, build_id));

        for (key, value) in env.iter() {
            debug!("{}={}", key, value);
        }

        Ok(env)
    }
}
