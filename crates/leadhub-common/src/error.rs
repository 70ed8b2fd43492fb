//! Error types for LeadHub

use thiserror::Error;

/// Result type alias for LeadHub operations
pub type Result<T> = std::result::Result<T, LeadHubError>;

/// Main error type for LeadHub
#[derive(Error, Debug)]
pub enum LeadHubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
