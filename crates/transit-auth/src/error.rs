use reqwest::StatusCode;
use thiserror::Error;

use crate::credentials::CredentialError;
use crate::outcome::TransportFailure;

/// Errors raised while wiring up clients and gateways.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL `{input}`: {reason}")]
    InvalidBaseUrl { input: String, reason: String },

    #[error("invalid value for header `{name}`: {value}")]
    InvalidHeader { name: &'static str, value: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors from the login / logout flow.
///
/// Regular API calls never produce these; they return an [`Outcome`](crate::Outcome).
#[derive(Debug, Error)]
pub enum AuthError {
    /// The auth provider answered with a non-success status.
    #[error("login rejected with HTTP {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    /// No response was received.
    #[error("transport error: {0}")]
    Transport(#[from] TransportFailure),

    /// The response could not be interpreted.
    #[error("invalid auth response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}
