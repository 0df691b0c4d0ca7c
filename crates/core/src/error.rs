//! Error types for rust-android
//!
//! Configuration problems are always fatal and are raised before any
//! subprocess is started.

use thiserror::Error;

/// Errors raised while loading or resolving project configuration
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Illegal value for property \"{property}\" / \"{env}\". Must be 0/1/true/false if set")]
    InvalidFlag { property: String, env: String },
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Shorthand for a missing or malformed setting
    pub fn config(msg: impl Into<String>) -> Self {
        CoreError::Config(msg.into())
    }
}
