use reqwest::StatusCode;
use thiserror::Error;
use transit_auth::{AuthError, ConfigError, CredentialError, TransportFailure};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Client setup error: {0}")]
    Client(#[from] ConfigError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Request failed with HTTP {status}: {message}")]
    Request { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] TransportFailure),

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<toml::de::Error> for AppError {
    fn from(error: toml::de::Error) -> Self {
        AppError::Config(error.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(error: toml::ser::Error) -> Self {
        AppError::Config(error.to_string())
    }
}
