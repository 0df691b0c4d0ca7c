//! Rust Android Build Engine
//!
//! Turns a variant and its configured targets into cargo invocations, runs
//! them, and stages the resulting libraries per ABI.

pub mod cargo_build;
pub mod config;
pub mod features;
pub mod runner;
pub mod stager;

pub use cargo_build::{CargoCommand, Invocation};
pub use config::{BuildRequest, Variant};
pub use features::feature_args;
pub use runner::{BuildContext, BuildUnit, PreparedBuild, UnitOutcome, VariantBuild};
pub use stager::StagedArtifact;

use rust_android_core::CoreError;
use rust_android_toolchain::ToolchainError;

/// Build errors
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] CoreError),
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
    #[error("`{program}` failed: {status}")]
    InvocationFailed {
        program: String,
        status: std::process::ExitStatus,
    },
    #[error("Invalid include pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Could not read build output: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
