//! rust-android core - configuration and shared types
//!
//! Loads the project file, per-machine `local.properties` overrides and the
//! process environment into one [`Settings`] view used by every build unit.

pub mod config;
pub mod error;
pub mod properties;

pub use config::{
    CargoConfig, FeatureSelection, FeatureSet, Profile, ProjectConfig, Settings, LOCAL_PROPERTIES,
    PROJECT_FILE,
};
pub use error::{CoreError, Result};
pub use properties::Properties;

/// rust-android version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
