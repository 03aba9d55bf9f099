//! SafeTutor error types

use thiserror::Error;

/// SafeTutor error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (invalid template, missing placeholder, bad config file).
    /// Surfaced to the operator, never sent to the model.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected by the security checkpoint
    #[error("Input blocked: {reason}")]
    Blocked {
        /// Classifier label or subsystem error reason
        reason: String,
    },

    /// External generation or analysis call failed or timed out
    #[error("Capability error: {0}")]
    Capability(String),

    /// A single item was rejected (oversize artifact, duplicate name)
    #[error("Validation error: {0}")]
    Validation(String),

    /// An ingest batch is already running for this session
    #[error("Busy: {0}")]
    Busy(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML config parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error came from the security checkpoint.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Error::Blocked { .. })
    }
}

/// Result type alias for SafeTutor operations
pub type Result<T> = std::result::Result<T, Error>;
