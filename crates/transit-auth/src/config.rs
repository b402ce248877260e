use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

pub const DEFAULT_USER_AGENT: &str = concat!("transit-auth/", env!("CARGO_PKG_VERSION"));

/// Lifetime requested for freshly issued access tokens, in minutes.
pub const DEFAULT_EXPIRES_IN_MINS: u32 = 60;

/// Options for the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL that relative request paths are resolved against
    pub base_url: String,

    /// Overall timeout for a single HTTP request (zero disables it)
    pub timeout: Duration,

    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

/// Endpoint layout of the auth provider and the headers the gateway attaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Path of the token refresh endpoint
    pub refresh_path: String,

    /// Path of the login endpoint
    pub login_path: String,

    /// Path returning the identity behind the current access token
    pub current_user_path: String,

    /// `expiresInMins` sent with login and refresh calls
    pub expires_in_mins: u32,

    /// Fixed `Content-Type` attached to every outbound call
    pub content_type: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            refresh_path: "/auth/refresh".to_owned(),
            login_path: "/auth/login".to_owned(),
            current_user_path: "/auth/me".to_owned(),
            expires_in_mins: DEFAULT_EXPIRES_IN_MINS,
            content_type: "application/json".to_owned(),
        }
    }
}

impl GatewayConfig {
    pub fn with_expires_in_mins(mut self, expires_in_mins: u32) -> Self {
        self.expires_in_mins = expires_in_mins;
        self
    }

    pub fn with_refresh_path(mut self, refresh_path: impl Into<String>) -> Self {
        self.refresh_path = refresh_path.into();
        self
    }
}
