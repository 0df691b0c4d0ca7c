//! rust-android - build Rust libraries for Android
//!
//! Resolves NDK toolchains for each requested platform, runs cargo with the
//! right environment, and stages the built libraries per ABI for packaging.
//!
//! ## Architecture
//!
//! - `rust-android-core`: project configuration and `local.properties`
//! - `rust-android-toolchain`: toolchain registry, NDK paths, environment
//! - `rust-android-build-engine`: cargo command lines, build units, staging

#![warn(clippy::all)]

pub mod commands;

// Re-export main components for library usage
pub use rust_android_build_engine as build;
pub use rust_android_core as core;
pub use rust_android_toolchain as toolchain;

/// Prelude module for convenient imports
pub mod prelude {
    pub use rust_android_build_engine::{BuildContext, BuildError, Variant, VariantBuild};
    pub use rust_android_core::{FeatureSelection, Profile, Settings};
    pub use rust_android_toolchain::{HostPlatform, ToolchainRegistry};
}
