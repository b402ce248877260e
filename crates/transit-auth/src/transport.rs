//! HTTP transport collaborator.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::http_client::build_client;
use crate::outcome::{ErrorBody, HttpFailure, Outcome, TransportErrorKind, TransportFailure};
use crate::request::RequestDescriptor;

/// Performs one network call.
///
/// Implementations report every result as an [`Outcome`]. A transport must
/// never turn a timeout or cancellation into a `401`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Outcome;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::with_client(build_client(config)?, &config.base_url)
    }

    /// Reuse an existing client.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            input: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                input: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }
        Ok(Self { client, base_url })
    }

    /// Absolute URLs pass through; everything else is joined onto the base.
    pub fn resolve(&self, url: &str) -> Result<Url, url::ParseError> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => self.base_url.join(url),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &RequestDescriptor) -> Outcome {
        let url = match self.resolve(request.url()) {
            Ok(url) => url,
            Err(e) => {
                return Outcome::TransportError(TransportFailure::new(
                    TransportErrorKind::Request,
                    format!("invalid URL `{}`: {e}", request.url()),
                ));
            }
        };

        let mut builder = self.client.request(request.method().clone(), url.clone());
        if let Some(headers) = request.headers() {
            builder = builder.headers(headers.clone());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        trace!(method = %request.method(), %url, "Sending request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(method = %request.method(), %url, error = %e, "Request failed without response");
                return Outcome::TransportError(TransportFailure::from_reqwest(&e));
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Outcome::TransportError(TransportFailure::from_reqwest(&e)),
        };

        debug!(method = %request.method(), %url, status = status.as_u16(), "Response received");

        if !status.is_success() {
            return Outcome::Failure(HttpFailure {
                status,
                body: ErrorBody::from_bytes(&bytes),
            });
        }

        if bytes.is_empty() {
            return Outcome::Success(Value::Null);
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(payload) => Outcome::Success(payload),
            Err(e) => Outcome::TransportError(TransportFailure::new(
                TransportErrorKind::Decode,
                format!("response body is not JSON: {e}"),
            )),
        }
    }
}
