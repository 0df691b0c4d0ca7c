//! NDK installation
//!
//! Reads the NDK version from `source.properties` and locates the
//! prebuilt LLVM toolchain directory for the host.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use rust_android_core::Properties;

use crate::host::HostPlatform;
use crate::ToolchainError;

/// Version reported when `source.properties` or its `Pkg.Revision` is missing
pub const UNKNOWN_NDK_VERSION: &str = "0.0";

/// An installed Android NDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdkInstallation {
    pub path: PathBuf,
    pub version: String,
}

impl NdkInstallation {
    pub fn new(path: PathBuf, version: impl Into<String>) -> Self {
        Self {
            path,
            version: version.into(),
        }
    }

    /// Analyze an NDK directory
    pub fn from_dir(path: &Path) -> Result<Self, ToolchainError> {
        let props = Properties::load(&path.join("source.properties"))?;
        let version = props.get_or("Pkg.Revision", UNKNOWN_NDK_VERSION);

        info!("Using NDK {} at {:?}", version, path);
        Ok(Self::new(path.to_path_buf(), version))
    }

    /// Leading numeric component of the version, e.g. 25 for `25.2.9519653`
    pub fn version_major(&self) -> Result<u32, ToolchainError> {
        let major = self.version.split('.').next().unwrap_or_default().trim();
        major
            .parse()
            .map_err(|_| ToolchainError::InvalidNdkVersion(self.version.clone()))
    }

    /// `toolchains/llvm/prebuilt/<host-tag>`
    pub fn toolchain_dir(&self, host: &HostPlatform) -> PathBuf {
        let dir = self
            .path
            .join("toolchains")
            .join("llvm")
            .join("prebuilt")
            .join(host.tag());
        debug!("NDK toolchain directory: {:?}", dir);
        dir
    }
}
