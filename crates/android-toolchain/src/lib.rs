//! Android Toolchain Resolution
//!
//! Turns a platform name into everything cargo needs to cross-compile:
//! - the toolchain descriptor from the static registry
//! - compiler and archiver paths inside the NDK
//! - the host's default target triple
//! - the environment for the cargo subprocess

pub mod detector;
pub mod env;
pub mod error;
pub mod host;
pub mod ndk;
pub mod paths;
pub mod registry;

pub use detector::{detect_default_triple, parse_host_triple};
pub use env::{EnvironmentSynthesizer, LinkerWrapper, ResolvedEnvironment};
pub use error::ToolchainError;
pub use host::{HostOs, HostPlatform};
pub use ndk::NdkInstallation;
pub use paths::UNIFIED_ARCHIVER_NDK;
pub use registry::{ToolchainDescriptor, ToolchainKind, ToolchainRegistry, TOOLCHAINS};
