//! Token manager implementation
//!
//! Performs the refresh-token exchange and caches the resulting bearer
//! token. There is deliberately no retry here: a failed exchange is fatal,
//! and the HTTP client performs at most one refresh per 401.

use super::TOKEN_PATH;
use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Holds the current access token and refreshes it via the OAuth endpoint
pub struct TokenManager {
    /// HTTP client for token requests
    http_client: Client,
    /// Full URL of the token endpoint
    token_url: String,
    /// OAuth refresh token
    refresh_token: String,
    /// OAuth client id
    client_id: String,
    /// OAuth client secret
    client_secret: String,
    /// Current access token, `None` until the first refresh
    access_token: Arc<RwLock<Option<String>>>,
}

impl TokenManager {
    /// Create a token manager against the given API host
    pub fn new(
        http_client: Client,
        base_url: &str,
        refresh_token: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            token_url: format!("{}{TOKEN_PATH}", base_url.trim_end_matches('/')),
            refresh_token: refresh_token.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Get the current access token, refreshing first if none is held
    pub async fn bearer(&self) -> Result<String> {
        {
            let token = self.access_token.read().await;
            if let Some(token) = token.as_ref() {
                return Ok(token.clone());
            }
        }
        self.refresh().await
    }

    /// Exchange the refresh token for a new access token
    ///
    /// Replaces the cached token on success. A non-2xx response or a
    /// response without an `access_token` field fails the exchange.
    pub async fn refresh(&self) -> Result<String> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.refresh_token.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::token_refresh(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::token_refresh(format!(
                "token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::token_refresh(format!("invalid token response: {e}")))?;

        debug!("access token refreshed");

        let mut token = self.access_token.write().await;
        *token = Some(token_response.access_token.clone());
        Ok(token_response.access_token)
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// OAuth token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}
