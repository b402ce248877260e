use std::{sync::OnceLock, time::Duration};

use reqwest::Client;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ConfigError;

/// Install the process-wide rustls crypto provider once.
///
/// The reqwest build uses `rustls-tls-*-no-provider`, so HTTPS requests fail
/// until a provider is installed.
pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Another crate installed it first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Build a `reqwest::Client` from `config`.
pub fn build_client(config: &ClientConfig) -> Result<Client, ConfigError> {
    install_rustls_provider();

    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout);

    if config.timeout > Duration::ZERO {
        builder = builder.timeout(config.timeout);
    }

    Ok(builder.build()?)
}
