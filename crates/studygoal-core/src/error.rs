//! Core error types for studygoal-core.
//!
//! Engine commands never fail; they degrade to no-ops. Errors only surface
//! at the edges: runtime setup, configuration I/O and caller-side input
//! validation.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studygoal-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Timer driver errors
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Home directory could not be resolved or created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Caller-side input validation errors.
///
/// The engines themselves never produce these; they exist for the
/// presentation layer that turns raw text into subjects and goals.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Subject name is empty or whitespace
    #[error("Subject name must not be blank")]
    BlankName,

    /// Minutes could not be parsed as an integer
    #[error("Invalid minutes '{0}': not a whole number")]
    NotANumber(String),

    /// Minutes parsed but is zero or negative
    #[error("Minutes must be positive, got {0}")]
    NonPositive(i64),

    /// Input does not follow the `name:minutes` form
    #[error("Expected 'name:minutes', got '{0}'")]
    Malformed(String),
}

/// Timer driver errors.
#[derive(Error, Debug)]
pub enum TimerError {
    /// A driver was constructed outside of a tokio runtime
    #[error("no tokio runtime is available to drive the ticker")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_converts_into_core_error() {
        let err: CoreError = ValidationError::BlankName.into();
        assert!(matches!(err, CoreError::Validation(ValidationError::BlankName)));
        assert_eq!(
            err.to_string(),
            "Validation error: Subject name must not be blank"
        );
    }

    #[test]
    fn unknown_key_message() {
        let err = ConfigError::UnknownKey("ui.theme".into());
        assert_eq!(err.to_string(), "unknown config key: ui.theme");
    }
}
