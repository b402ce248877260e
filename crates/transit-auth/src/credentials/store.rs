//! Credential storage abstraction.
//!
//! The gateway reads tokens through this trait before every call and writes the
//! replacement pair after a successful refresh. Persistence belongs to the
//! implementation.

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::CredentialError;
use super::types::{Credentials, Identity};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current token pair, if any has been stored.
    async fn get(&self) -> Option<Credentials>;

    /// Identity associated with the current token pair.
    async fn identity(&self) -> Option<Identity>;

    /// Replace the token pair and identity as one unit.
    ///
    /// Readers must never observe the new access token with the old refresh
    /// token or the other way round.
    async fn set(
        &self,
        credentials: Credentials,
        identity: Option<Identity>,
    ) -> Result<(), CredentialError>;

    /// Forget everything (logout).
    async fn clear(&self) -> Result<(), CredentialError>;
}

#[derive(Debug, Clone)]
struct StoredSession {
    credentials: Credentials,
    identity: Option<Identity>,
}

/// Process-local credential store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    state: RwLock<Option<StoredSession>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously saved state, as-is.
    ///
    /// No validation happens here: a restored pair may lack a token.
    pub fn seeded(credentials: Credentials, identity: Option<Identity>) -> Self {
        Self {
            state: RwLock::new(Some(StoredSession {
                credentials,
                identity,
            })),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().is_none()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self) -> Option<Credentials> {
        self.state.read().as_ref().map(|s| s.credentials.clone())
    }

    async fn identity(&self) -> Option<Identity> {
        self.state.read().as_ref().and_then(|s| s.identity.clone())
    }

    async fn set(
        &self,
        credentials: Credentials,
        identity: Option<Identity>,
    ) -> Result<(), CredentialError> {
        credentials.validate()?;
        *self.state.write() = Some(StoredSession {
            credentials,
            identity,
        });
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialError> {
        self.state.write().take();
        Ok(())
    }
}
