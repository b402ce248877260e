//! Outbound request descriptors.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::warn;

/// Immutable description of one outbound call.
///
/// The gateway never mutates a descriptor. Decoration produces a new value, so the
/// caller's descriptor can be replayed verbatim after a token refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    url: String,
    method: Method,
    body: Option<Value>,
    headers: Option<HeaderMap>,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` on `url`.
    ///
    /// `url` is either absolute or a path resolved against the transport's base URL.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            body: None,
            headers: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, url).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers
            .get_or_insert_with(HeaderMap::new)
            .insert(name, value);
        self
    }

    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    #[inline]
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.headers.as_ref()
    }

    /// Value of the `Authorization` header, if any.
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|h| h.get(AUTHORIZATION))
            .and_then(|v| v.to_str().ok())
    }

    /// Derive a descriptor carrying the fixed content type and, when `access_token`
    /// is non-empty, a bearer `Authorization` header.
    ///
    /// Caller-supplied headers are kept; the two decoration headers replace any
    /// caller value of the same name.
    pub fn decorate(&self, access_token: Option<&str>, content_type: &HeaderValue) -> Self {
        let mut headers = self.headers.clone().unwrap_or_default();
        headers.insert(CONTENT_TYPE, content_type.clone());

        match access_token.filter(|t| !t.is_empty()) {
            Some(token) => match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => {
                    warn!(url = %self.url, "Access token is not a valid header value; sending without it");
                    headers.remove(AUTHORIZATION);
                }
            },
            None => {
                headers.remove(AUTHORIZATION);
            }
        }

        Self {
            url: self.url.clone(),
            method: self.method.clone(),
            body: self.body.clone(),
            headers: Some(headers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_type() -> HeaderValue {
        HeaderValue::from_static("application/json")
    }

    #[test]
    fn decorate_adds_bearer_and_content_type() {
        let original = RequestDescriptor::get("/auth/me");
        let decorated = original.decorate(Some("A1"), &json_type());

        assert_eq!(decorated.authorization(), Some("Bearer A1"));
        assert_eq!(
            decorated.headers().unwrap().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        // The original stays untouched for replay.
        assert!(original.headers().is_none());
        assert_eq!(decorated.url(), original.url());
        assert_eq!(decorated.method(), original.method());
    }

    #[test]
    fn decorate_without_token_omits_authorization() {
        let decorated = RequestDescriptor::get("/auth/me").decorate(Some(""), &json_type());
        assert!(decorated.authorization().is_none());

        let decorated = RequestDescriptor::get("/auth/me").decorate(None, &json_type());
        assert!(decorated.authorization().is_none());
    }

    #[test]
    fn decoration_overrides_caller_authorization() {
        let original = RequestDescriptor::get("/auth/me")
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer stale"))
            .with_header(
                HeaderName::from_static("x-trace"),
                HeaderValue::from_static("abc"),
            );

        let decorated = original.decorate(Some("fresh"), &json_type());
        assert_eq!(decorated.authorization(), Some("Bearer fresh"));
        assert_eq!(decorated.headers().unwrap().get("x-trace").unwrap(), "abc");

        let anonymous = original.decorate(None, &json_type());
        assert!(anonymous.authorization().is_none());
    }

    #[test]
    fn decorate_keeps_body() {
        let original = RequestDescriptor::post("/auth/login", json!({"username": "emilys"}));
        let decorated = original.decorate(None, &json_type());
        assert_eq!(decorated.body(), Some(&json!({"username": "emilys"})));
    }
}
