//! Credential error types.

use thiserror::Error;

/// Errors that can occur during credential operations.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// A token pair is stored only as a whole.
    #[error("Missing token in credentials: {0}")]
    MissingToken(&'static str),

    /// Persisting credentials failed.
    #[error("Failed to persist credentials: {0}")]
    Persistence(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
