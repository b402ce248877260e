//! Authenticated API client for the transit app.
//!
//! The centre of this crate is the [`ReauthGateway`]: every request is sent
//! with the stored access token, and a `401 Unauthorized` answer triggers at
//! most one token refresh followed by at most one replay of the original
//! request.
//!
//! # Architecture
//!
//! - [`RequestDescriptor`]: immutable description of one outbound call
//! - [`Outcome`]: success payload, HTTP status failure, or transport failure
//! - [`HttpTransport`]: performs the network call ([`ReqwestTransport`])
//! - [`CredentialStore`]: holds the token pair and identity ([`InMemoryCredentialStore`])
//! - [`SessionListener`]: receives the deauthenticate signal ([`SessionHandle`])
//! - [`AuthClient`]: login, current user and logout on top of the gateway

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod http_client;
pub mod outcome;
pub mod request;
pub mod session;
pub mod transport;

pub use auth::{AuthClient, LoginRequest};
pub use config::{ClientConfig, GatewayConfig};
pub use credentials::{CredentialError, CredentialStore, Credentials, Identity, InMemoryCredentialStore};
pub use error::{AuthError, ConfigError};
pub use gateway::{Execution, FailureKind, Phase, ReauthGateway};
pub use outcome::{ErrorBody, HttpFailure, Outcome, TransportErrorKind, TransportFailure};
pub use request::RequestDescriptor;
pub use session::{NoopSessionListener, SessionHandle, SessionListener, SessionState};
pub use transport::{HttpTransport, ReqwestTransport};
