use crate::{
    config::AppConfig,
    error::{AppError, Result},
    output::{OutputManager, write_output},
    store::FileCredentialStore,
};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use transit_auth::{
    AuthClient, CredentialStore, Execution, LoginRequest, Outcome, Phase, ReqwestTransport,
    RequestDescriptor, SessionHandle,
};

/// Application shell around the auth client.
///
/// Acts as the session owner: when the gateway deauthenticates the session, the
/// stored credentials are wiped and the user has to log in again.
pub struct CommandExecutor {
    auth: AuthClient,
    store: Arc<FileCredentialStore>,
    output: OutputManager,
}

impl CommandExecutor {
    pub async fn new(config: &AppConfig, output: OutputManager) -> Result<Self> {
        let store = Arc::new(FileCredentialStore::open(config.credentials_file()?).await?);

        let session = match store.get().await {
            Some(credentials) if credentials.has_access_token() => SessionHandle::authenticated(),
            _ => SessionHandle::deauthenticated(),
        };

        let transport = Arc::new(ReqwestTransport::new(&config.client_config())?);
        let auth = AuthClient::new(
            transport,
            store.clone(),
            Arc::new(session),
            config.gateway_config(),
        )?;

        Ok(Self {
            auth,
            store,
            output,
        })
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        expires_in_mins: Option<u32>,
    ) -> Result<()> {
        let mut request = LoginRequest::new(username, password);
        if let Some(minutes) = expires_in_mins {
            request = request.with_expires_in_mins(minutes);
        }

        let identity = self.auth.login(&request).await?;
        debug!(path = %self.store.path().display(), "Credentials saved");

        write_output(&self.output.format_identity(&identity)?)
    }

    pub async fn me(&self) -> Result<()> {
        let path = self.auth.gateway().config().current_user_path.clone();
        self.send(RequestDescriptor::get(path)).await
    }

    pub async fn request(&self, method: &str, path: &str, body: Option<&str>) -> Result<()> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| AppError::InvalidInput(format!("invalid HTTP method `{method}`")))?;

        let mut descriptor = RequestDescriptor::new(method, path);
        if let Some(body) = body {
            let body: Value = serde_json::from_str(body)
                .map_err(|e| AppError::InvalidInput(format!("body is not valid JSON: {e}")))?;
            descriptor = descriptor.with_body(body);
        }

        self.send(descriptor).await
    }

    pub async fn status(&self) -> Result<()> {
        let authenticated = self.auth.is_authenticated().await;
        let identity = self.auth.identity().await;
        write_output(&self.output.format_status(authenticated, identity.as_ref())?)
    }

    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await?;
        info!("Logged out");
        write_output(&self.output.format_message("Logged out")?)
    }

    async fn send(&self, descriptor: RequestDescriptor) -> Result<()> {
        let execution = self.auth.gateway().execute_traced(&descriptor).await;
        self.on_execution(&execution).await?;

        match execution.outcome {
            Outcome::Success(payload) => write_output(&self.output.format_payload(&payload)?),
            Outcome::Failure(_) if execution.deauthenticated => Err(AppError::SessionExpired),
            Outcome::Failure(failure) => Err(AppError::Request {
                status: failure.status,
                message: failure
                    .body
                    .message()
                    .unwrap_or("no message")
                    .to_string(),
            }),
            Outcome::TransportError(failure) => Err(failure.into()),
        }
    }

    /// Keep the session handle and the credentials file in step with the gateway.
    async fn on_execution(&self, execution: &Execution) -> Result<()> {
        debug!(
            phase = ?execution.phase,
            failure = ?execution.failure_kind(),
            "Request finished"
        );

        if execution.deauthenticated && !self.auth.session().is_authenticated() {
            warn!("Session is no longer valid; clearing stored credentials");
            self.store.clear().await?;
        } else if execution.phase == Phase::Replayed {
            // A replay means the refresh stored a full pair.
            self.auth.session().mark_authenticated();
        }
        Ok(())
    }
}
