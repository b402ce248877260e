//! Result values of network operations.
//!
//! Failures are values, never errors: callers render degraded states from an
//! [`Outcome`] the same way whatever went wrong.

use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result of sending one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 2xx response with its parsed JSON payload (`null` for an empty body).
    Success(Value),
    /// The server answered with a non-success status.
    Failure(HttpFailure),
    /// No response was received (connect error, timeout, cancellation, undecodable body).
    TransportError(TransportFailure),
}

impl Outcome {
    /// Shorthand for a status failure without a body.
    pub fn status(status: StatusCode) -> Self {
        Self::Failure(HttpFailure {
            status,
            body: ErrorBody::default(),
        })
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The only outcome that triggers the refresh flow.
    #[inline]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Failure(f) if f.status == StatusCode::UNAUTHORIZED)
    }

    /// Status code of an HTTP failure.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Failure(f) => Some(f.status),
            _ => None,
        }
    }
}

/// Non-success HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpFailure {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.body.message() {
            Some(message) => write!(f, "HTTP {}: {}", self.status, message),
            None => write!(f, "HTTP {}", self.status),
        }
    }
}

/// Parsed error body. Only `message` is interpreted; the raw JSON is kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorBody {
    message: Option<String>,
    raw: Value,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            raw: serde_json::json!({ "message": message }),
            message: Some(message),
        }
    }

    /// Parse a response body. Non-JSON bodies become the message text.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::default();
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(raw) => Self {
                message: raw
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_owned),
                raw,
            },
            Err(_) => {
                let text = String::from_utf8_lossy(bytes).trim().to_string();
                Self {
                    message: (!text.is_empty()).then(|| text.clone()),
                    raw: Value::String(text),
                }
            }
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    /// The response arrived but its body could not be read or decoded.
    Decode,
    /// The request could not be built or sent.
    Request,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Decode => "decode",
            Self::Request => "request",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request that produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct TransportFailure {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportFailure {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a reqwest error.
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else if e.is_body() || e.is_decode() {
            TransportErrorKind::Decode
        } else {
            TransportErrorKind::Request
        };
        Self::new(kind, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_401_counts_as_unauthorized() {
        assert!(Outcome::status(StatusCode::UNAUTHORIZED).is_unauthorized());
        assert!(!Outcome::status(StatusCode::FORBIDDEN).is_unauthorized());
        assert!(!Outcome::Success(json!({})).is_unauthorized());
        assert!(
            !Outcome::TransportError(TransportFailure::new(TransportErrorKind::Timeout, "slow"))
                .is_unauthorized()
        );
    }

    #[test]
    fn error_body_reads_message_field() {
        let body = ErrorBody::from_bytes(br#"{"message":"Token Expired!","code":7}"#);
        assert_eq!(body.message(), Some("Token Expired!"));
        assert_eq!(body.raw()["code"], 7);
    }

    #[test]
    fn error_body_keeps_plain_text() {
        let body = ErrorBody::from_bytes(b"Internal Server Error\n");
        assert_eq!(body.message(), Some("Internal Server Error"));
        assert_eq!(body.raw(), &json!("Internal Server Error"));

        let empty = ErrorBody::from_bytes(b"");
        assert_eq!(empty.message(), None);
        assert_eq!(empty.raw(), &Value::Null);
    }

    #[test]
    fn http_failure_display() {
        let failure = HttpFailure {
            status: StatusCode::NOT_FOUND,
            body: ErrorBody::new("Station not found"),
        };
        assert_eq!(failure.to_string(), "HTTP 404 Not Found: Station not found");
    }
}
