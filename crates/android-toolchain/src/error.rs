//! Toolchain resolution errors

use rust_android_core::CoreError;

/// Configuration errors found while resolving a toolchain. All of them are
/// raised before any subprocess runs.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    #[error("Target '{0}' is not a recognized toolchain.")]
    UnknownPlatform(String),
    #[error("Unparseable NDK version: {0:?}")]
    InvalidNdkVersion(String),
    #[error(transparent)]
    Config(#[from] CoreError),
}
