//! Configuration errors (thiserror-based).

use thiserror::Error;

/// Errors raised while loading or validating an [`EditorConfig`](crate::EditorConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
