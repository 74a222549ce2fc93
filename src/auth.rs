//! Credential exchange against the account service

use crate::client::{CzdsClient, reason_phrase};
use crate::error::{AuthError, Result};
use crate::types::{AccessToken, Credentials};
use serde::Deserialize;
use tracing::debug;

/// Message the account service returns on a successful login
pub const AUTH_SUCCESS_MESSAGE: &str = "Authentication Successful";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl CzdsClient {
    /// Exchange credentials for a bearer token
    ///
    /// Performs exactly one request. There are no retries.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Status`] if the account service answers with a non-2xx status
    /// - [`AuthError::Rejected`] if the response message is not the success marker
    /// - [`AuthError::MissingToken`] if a successful response carries no token
    /// - `Network`/`Serialization` for transport or JSON failures
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken> {
        debug!(username = %credentials.username, "getting access token");

        let url = self.config.authenticate_url()?;
        let response = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Status {
                status: status.as_u16(),
                reason: reason_phrase(status),
            }
            .into());
        }

        let body = response.bytes().await?;
        let data: AuthResponse = serde_json::from_slice(&body)?;

        let message = data.message.unwrap_or_default();
        if message != AUTH_SUCCESS_MESSAGE {
            return Err(AuthError::Rejected { message }.into());
        }

        match data.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err(AuthError::MissingToken.into()),
        }
    }
}
