//! Credential management module.
//!
//! - [`Credentials`]: the access / refresh token pair
//! - [`Identity`]: the user the pair belongs to, passed through untouched
//! - [`CredentialStore`]: shared holder of both, injected into the gateway

mod error;
mod store;
mod types;

pub use error::CredentialError;
pub use store::{CredentialStore, InMemoryCredentialStore};
pub use types::{Credentials, Identity};
