//! HTTP client shared by every request of a run

use crate::config::Config;
use crate::error::{Error, Result};

/// Thin wrapper over a configured `reqwest::Client`
///
/// Credential exchange, catalog fetch and zone downloads are implemented as
/// `impl CzdsClient` blocks in their own modules.
#[derive(Clone, Debug)]
pub struct CzdsClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: Config,
}

impl CzdsClient {
    /// Build a client from configuration
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be created
    pub fn new(config: Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.http.user_agent.clone());
        if let Some(timeout) = config.http.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.http.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let http = builder.build().map_err(|e| Error::Config {
            message: format!("failed to create HTTP client: {e}"),
            key: Some("http".to_string()),
        })?;

        Ok(Self { http, config })
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Reason phrase for a status, empty for non-standard codes
pub(crate) fn reason_phrase(status: reqwest::StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}
