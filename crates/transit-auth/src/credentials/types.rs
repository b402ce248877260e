//! Core credential types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::CredentialError;

/// Access / refresh token pair.
///
/// An empty string stands for an absent token. Stores only accept complete
/// pairs through [`CredentialStore::set`](super::CredentialStore::set); partial
/// pairs only show up in restored state.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl Credentials {
    /// Create a complete token pair.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let credentials = Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Fail unless both tokens are present.
    pub fn validate(&self) -> Result<(), CredentialError> {
        if !self.has_access_token() {
            return Err(CredentialError::MissingToken("accessToken"));
        }
        if !self.has_refresh_token() {
            return Err(CredentialError::MissingToken("refreshToken"));
        }
        Ok(())
    }

    #[inline]
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    #[inline]
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Access token, if present.
    pub fn bearer(&self) -> Option<&str> {
        self.has_access_token().then_some(self.access_token.as_str())
    }
}

// Tokens never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(token: &str) -> &'static str {
            if token.is_empty() { "<empty>" } else { "<redacted>" }
        }
        f.debug_struct("Credentials")
            .field("access_token", &mask(&self.access_token))
            .field("refresh_token", &mask(&self.refresh_token))
            .finish()
    }
}

/// The user a token pair was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Identity {
    /// "First Last", falling back to the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
