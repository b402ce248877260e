//! Re-auth gateway.
//!
//! Every call goes through three phases at most:
//!
//! 1. **Initial** - send the request with the stored access token
//! 2. **Refreshing** - on `401`, exchange the refresh token for a new pair
//! 3. **Replayed** - resend the original request once with the new token
//!
//! `Replayed` is terminal: whatever the replay returns goes back to the caller,
//! including another `401`. A failed refresh (or a missing refresh token) ends the
//! call with the original `401` and a deauthenticate signal.

use std::sync::Arc;

use reqwest::header::HeaderValue;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::config::GatewayConfig;
use crate::credentials::{CredentialStore, Credentials};
use crate::error::ConfigError;
use crate::outcome::{HttpFailure, Outcome, TransportFailure};
use crate::request::RequestDescriptor;
use crate::session::SessionListener;
use crate::transport::HttpTransport;

/// Last phase an execution reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    Refreshing,
    Replayed,
}

/// Classification of a failed execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// `401` that could not be recovered; the original response is returned.
    AuthExpired,
    /// Non-401 HTTP failure on the first attempt.
    RequestFailed,
    /// No response on the first attempt.
    TransportError,
    /// The post-refresh replay failed, with any status or without response.
    ReplayFailed,
}

/// Outcome of [`ReauthGateway::execute_traced`] with how it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub outcome: Outcome,
    pub phase: Phase,
    /// Whether this execution signalled the session owner.
    pub deauthenticated: bool,
}

impl Execution {
    fn new(outcome: Outcome, phase: Phase, deauthenticated: bool) -> Self {
        Self {
            outcome,
            phase,
            deauthenticated,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        if self.outcome.is_success() {
            return None;
        }

        Some(match (self.phase, &self.outcome) {
            (Phase::Replayed, _) => FailureKind::ReplayFailed,
            _ if self.deauthenticated => FailureKind::AuthExpired,
            (_, Outcome::TransportError(_)) => FailureKind::TransportError,
            _ => FailureKind::RequestFailed,
        })
    }
}

#[derive(Debug, Error)]
enum RefreshError {
    #[error("refresh rejected: {0}")]
    Rejected(HttpFailure),
    #[error("refresh transport error: {0}")]
    Transport(TransportFailure),
    #[error("malformed refresh response: {0}")]
    Malformed(String),
}

/// Sends requests with the stored credentials and recovers from expired access
/// tokens with a single refresh and replay.
///
/// The gateway keeps no mutable state; concurrent callers share it behind an
/// `Arc` and each call carries its own replay state.
pub struct ReauthGateway {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn CredentialStore>,
    session: Arc<dyn SessionListener>,
    config: GatewayConfig,
    content_type: HeaderValue,
}

impl ReauthGateway {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CredentialStore>,
        session: Arc<dyn SessionListener>,
    ) -> Self {
        Self {
            transport,
            store,
            session,
            config: GatewayConfig::default(),
            content_type: HeaderValue::from_static("application/json"),
        }
    }

    pub fn with_config(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CredentialStore>,
        session: Arc<dyn SessionListener>,
        config: GatewayConfig,
    ) -> Result<Self, ConfigError> {
        let content_type =
            HeaderValue::from_str(&config.content_type).map_err(|_| ConfigError::InvalidHeader {
                name: "content-type",
                value: config.content_type.clone(),
            })?;

        Ok(Self {
            transport,
            store,
            session,
            config,
            content_type,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Decorate `request` with the fixed content type and `access_token`.
    pub fn decorate(&self, request: &RequestDescriptor, access_token: Option<&str>) -> RequestDescriptor {
        request.decorate(access_token, &self.content_type)
    }

    /// Execute `request`, refreshing and replaying at most once on `401`.
    pub async fn execute(&self, request: &RequestDescriptor) -> Outcome {
        self.execute_traced(request).await.outcome
    }

    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn execute_traced(&self, request: &RequestDescriptor) -> Execution {
        let current = self.store.get().await;
        let outcome = self
            .send_with(request, current.as_ref().and_then(Credentials::bearer))
            .await;

        if !outcome.is_unauthorized() {
            return Execution::new(outcome, Phase::Initial, false);
        }

        // Read again: a concurrent call may have refreshed meanwhile.
        let Some(current) = self
            .store
            .get()
            .await
            .filter(Credentials::has_refresh_token)
        else {
            debug!("Unauthorized without refresh token");
            self.session.on_deauthenticated();
            return Execution::new(outcome, Phase::Initial, true);
        };

        let fresh = match self.refresh(&current).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.session.on_deauthenticated();
                return Execution::new(outcome, Phase::Refreshing, true);
            }
        };

        let replayed = self.send_with(request, fresh.bearer()).await;
        if !replayed.is_success() {
            debug!(status = ?replayed.status_code(), "Replay after refresh failed");
        }
        Execution::new(replayed, Phase::Replayed, false)
    }

    async fn send_with(&self, request: &RequestDescriptor, access_token: Option<&str>) -> Outcome {
        let decorated = self.decorate(request, access_token);
        self.transport.send(&decorated).await
    }

    /// Exchange the refresh token for a new pair and store it.
    ///
    /// The refresh call is sent directly to the transport and is never retried.
    async fn refresh(&self, current: &Credentials) -> Result<Credentials, RefreshError> {
        let request = RequestDescriptor::post(
            self.config.refresh_path.as_str(),
            json!({
                "refreshToken": current.refresh_token,
                "expiresInMins": self.config.expires_in_mins,
            }),
        );

        let payload = match self.send_with(&request, current.bearer()).await {
            Outcome::Success(payload) => payload,
            Outcome::Failure(failure) => return Err(RefreshError::Rejected(failure)),
            Outcome::TransportError(failure) => return Err(RefreshError::Transport(failure)),
        };

        let fresh: Credentials = serde_json::from_value(payload)
            .map_err(|e| RefreshError::Malformed(e.to_string()))?;
        fresh
            .validate()
            .map_err(|e| RefreshError::Malformed(e.to_string()))?;

        let identity = self.store.identity().await;
        if let Err(e) = self.store.set(fresh.clone(), identity).await {
            // The new pair is still valid for this call's replay.
            error!(error = %e, "Failed to store refreshed credentials");
        } else {
            info!("Access token refreshed");
        }

        Ok(fresh)
    }
}
