//! Login, current user and logout against the auth provider.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::config::GatewayConfig;
use crate::credentials::{CredentialStore, Credentials, Identity};
use crate::error::{AuthError, ConfigError};
use crate::gateway::ReauthGateway;
use crate::outcome::Outcome;
use crate::request::RequestDescriptor;
use crate::session::SessionHandle;
use crate::transport::HttpTransport;

/// Login parameters; the lifetime falls back to [`GatewayConfig::expires_in_mins`].
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub expires_in_mins: Option<u32>,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            expires_in_mins: None,
        }
    }

    pub fn with_expires_in_mins(mut self, expires_in_mins: u32) -> Self {
        self.expires_in_mins = Some(expires_in_mins);
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(flatten)]
    identity: Identity,
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    refresh_token: String,
}

/// Session lifecycle on top of a [`ReauthGateway`].
pub struct AuthClient {
    gateway: ReauthGateway,
    session: Arc<SessionHandle>,
}

impl AuthClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CredentialStore>,
        session: Arc<SessionHandle>,
        config: GatewayConfig,
    ) -> Result<Self, ConfigError> {
        let gateway = ReauthGateway::with_config(transport, store, session.clone(), config)?;
        Ok(Self { gateway, session })
    }

    pub fn gateway(&self) -> &ReauthGateway {
        &self.gateway
    }

    pub fn session(&self) -> &Arc<SessionHandle> {
        &self.session
    }

    /// Log in and store the issued credentials together with the identity.
    ///
    /// The login call is sent without any stored token and is never retried.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: &LoginRequest) -> Result<Identity, AuthError> {
        let config = self.gateway.config();
        let body = json!({
            "username": request.username,
            "password": request.password,
            "expiresInMins": request.expires_in_mins.unwrap_or(config.expires_in_mins),
        });
        let descriptor = self
            .gateway
            .decorate(&RequestDescriptor::post(config.login_path.as_str(), body), None);

        let payload = match self.gateway.transport().send(&descriptor).await {
            Outcome::Success(payload) => payload,
            Outcome::Failure(failure) => {
                return Err(AuthError::Rejected {
                    status: failure.status,
                    message: failure
                        .body
                        .message()
                        .unwrap_or("no message")
                        .to_string(),
                });
            }
            Outcome::TransportError(failure) => return Err(AuthError::Transport(failure)),
        };

        let response: LoginResponse =
            serde_json::from_value(payload).map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        let credentials = Credentials::new(response.access_token, response.refresh_token)?;

        self.gateway
            .store()
            .set(credentials, Some(response.identity.clone()))
            .await?;
        self.session.mark_authenticated();

        info!(user_id = response.identity.id, "Logged in");
        Ok(response.identity)
    }

    /// Fetch the identity behind the current access token.
    pub async fn current_user(&self) -> Outcome {
        let path = self.gateway.config().current_user_path.as_str();
        self.gateway.execute(&RequestDescriptor::get(path)).await
    }

    /// Forget the stored credentials and signal deauthentication.
    ///
    /// Safe to call when already logged out.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.gateway.store().clear().await?;
        self.session.deauthenticate();
        Ok(())
    }

    /// Whether a non-empty access token is stored.
    pub async fn is_authenticated(&self) -> bool {
        self.gateway
            .store()
            .get()
            .await
            .is_some_and(|c| c.has_access_token())
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.gateway.store().identity().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{CredentialError, InMemoryCredentialStore};
    use crate::outcome::{ErrorBody, HttpFailure};
    use crate::session::SessionState;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use reqwest::StatusCode;
    use serde_json::json;

    struct OneShotTransport {
        response: Mutex<Option<Outcome>>,
        sent: Mutex<Vec<RequestDescriptor>>,
    }

    impl OneShotTransport {
        fn new(response: Outcome) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(response)),
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for OneShotTransport {
        async fn send(&self, request: &RequestDescriptor) -> Outcome {
            self.sent.lock().push(request.clone());
            self.response.lock().take().expect("single request expected")
        }
    }

    fn client(transport: Arc<OneShotTransport>, store: Arc<InMemoryCredentialStore>) -> AuthClient {
        AuthClient::new(
            transport,
            store,
            Arc::new(SessionHandle::deauthenticated()),
            GatewayConfig::default(),
        )
        .unwrap()
    }

    fn login_payload() -> serde_json::Value {
        json!({
            "id": 1,
            "username": "emilys",
            "email": "emily.johnson@x.dummyjson.com",
            "firstName": "Emily",
            "lastName": "Johnson",
            "gender": "female",
            "image": "https://dummyjson.com/icon/emilys/128",
            "accessToken": "A1",
            "refreshToken": "R1"
        })
    }

    #[tokio::test]
    async fn login_stores_credentials_and_identity() {
        let transport = OneShotTransport::new(Outcome::Success(login_payload()));
        let store = Arc::new(InMemoryCredentialStore::new());
        let auth = client(transport.clone(), store.clone());

        let identity = auth
            .login(&LoginRequest::new("emilys", "emilyspass"))
            .await
            .unwrap();

        assert_eq!(identity.username, "emilys");
        assert_eq!(store.get().await, Some(Credentials::new("A1", "R1").unwrap()));
        assert_eq!(store.identity().await, Some(identity));
        assert_eq!(auth.session().state(), SessionState::Authenticated);
        assert!(auth.is_authenticated().await);

        let sent = transport.sent.lock();
        assert_eq!(sent[0].url(), "/auth/login");
        assert!(sent[0].authorization().is_none());
        assert_eq!(
            sent[0].body(),
            Some(&json!({"username": "emilys", "password": "emilyspass", "expiresInMins": 60}))
        );
    }

    #[tokio::test]
    async fn login_keeps_explicit_expiry() {
        let transport = OneShotTransport::new(Outcome::Success(login_payload()));
        let auth = client(transport.clone(), Arc::new(InMemoryCredentialStore::new()));

        auth.login(&LoginRequest::new("emilys", "emilyspass").with_expires_in_mins(5))
            .await
            .unwrap();

        assert_eq!(transport.sent.lock()[0].body().unwrap()["expiresInMins"], 5);
    }

    #[tokio::test]
    async fn rejected_login_reports_message() {
        let transport = OneShotTransport::new(Outcome::Failure(HttpFailure {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody::new("Invalid credentials"),
        }));
        let store = Arc::new(InMemoryCredentialStore::new());
        let auth = client(transport, store.clone());

        let err = auth
            .login(&LoginRequest::new("emilys", "wrong-pass"))
            .await
            .unwrap_err();

        match err {
            AuthError::Rejected { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.is_empty());
        assert!(!auth.is_authenticated().await);
        assert!(!auth.session().is_authenticated());
    }

    #[tokio::test]
    async fn login_without_tokens_is_rejected() {
        let mut payload = login_payload();
        payload.as_object_mut().unwrap().remove("refreshToken");
        let transport = OneShotTransport::new(Outcome::Success(payload));
        let store = Arc::new(InMemoryCredentialStore::new());
        let auth = client(transport, store.clone());

        let err = auth
            .login(&LoginRequest::new("emilys", "emilyspass"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AuthError::Credential(CredentialError::MissingToken("refreshToken"))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn logout_clears_store_and_is_idempotent() {
        let transport = OneShotTransport::new(Outcome::Success(login_payload()));
        let store = Arc::new(InMemoryCredentialStore::new());
        let auth = client(transport, store.clone());
        auth.login(&LoginRequest::new("emilys", "emilyspass"))
            .await
            .unwrap();

        auth.logout().await.unwrap();
        assert!(store.is_empty());
        assert_eq!(auth.session().state(), SessionState::Deauthenticated);

        auth.logout().await.unwrap();
        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn current_user_goes_through_gateway() {
        let transport = OneShotTransport::new(Outcome::Success(json!({"id": 1})));
        let store = Arc::new(InMemoryCredentialStore::seeded(
            Credentials::new("A1", "R1").unwrap(),
            None,
        ));
        let auth = client(transport.clone(), store);

        let outcome = auth.current_user().await;

        assert_eq!(outcome, Outcome::Success(json!({"id": 1})));
        let sent = transport.sent.lock();
        assert_eq!(sent[0].url(), "/auth/me");
        assert_eq!(sent[0].authorization(), Some("Bearer A1"));
    }
}
