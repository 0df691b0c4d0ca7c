//! Host platform detection
//!
//! The host decides the NDK prebuilt directory name, the clang wrapper
//! suffix and which linker wrapper script is used.

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    /// Linux and every other unix-like host
    Linux,
}

/// Operating system and CPU architecture of the machine running the build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    pub os: HostOs,
    pub arch: String,
}

impl HostPlatform {
    pub fn new(os: HostOs, arch: impl Into<String>) -> Self {
        Self {
            os,
            arch: arch.into(),
        }
    }

    /// The machine we are running on
    pub fn current() -> Self {
        let os = if cfg!(windows) {
            HostOs::Windows
        } else if cfg!(target_os = "macos") {
            HostOs::MacOs
        } else {
            HostOs::Linux
        };
        Self::new(os, std::env::consts::ARCH)
    }

    pub fn is_windows(&self) -> bool {
        self.os == HostOs::Windows
    }

    /// Directory name under `toolchains/llvm/prebuilt` in the NDK
    pub fn tag(&self) -> &'static str {
        match self.os {
            HostOs::Windows if matches!(self.arch.as_str(), "x86_64" | "amd64") => "windows-x86_64",
            HostOs::Windows => "windows",
            HostOs::MacOs => "darwin-x86_64",
            HostOs::Linux => "linux-x86_64",
        }
    }

    /// Suffix of the NDK clang driver wrappers
    pub fn clang_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".cmd"
        } else {
            ""
        }
    }
}
