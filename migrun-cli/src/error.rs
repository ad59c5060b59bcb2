//! Error types for migrun-cli

use thiserror::Error;

/// Result type alias for migrun-cli operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by the command-line front end
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Migration(#[from] migrun::Error),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::ConfigError(err.to_string())
    }
}
