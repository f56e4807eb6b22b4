//! API client with retry, rate limiting and transparent re-authentication
//!
//! Retry contract:
//! - connect errors, timeouts and non-2xx statuses are transient and are
//!   retried with exponential backoff, 10 attempts total; the last error
//!   surfaces once the budget is spent
//! - a 401 triggers exactly one token refresh and one immediate retry of
//!   the same request; a second consecutive 401 is a fatal auth error
//! - the rate limiter gates every outbound call, including retries

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::BASE_URL;
use crate::auth::TokenManager;
use crate::error::{Error, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for all requests
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Total attempts per request, including the first
    pub max_attempts: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Rate limiter configuration, `None` disables local rate limiting
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_attempts: 10,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
            rate_limit: Some(RateLimiterConfig::default()),
        }
    }
}

impl ApiClientConfig {
    /// Create a new config builder
    pub fn builder() -> ApiClientConfigBuilder {
        ApiClientConfigBuilder::default()
    }
}

/// Builder for API client config
#[derive(Default)]
pub struct ApiClientConfigBuilder {
    config: ApiClientConfig,
}

impl ApiClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set total attempts per request
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    /// Set backoff bounds
    pub fn backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Build the config
    pub fn build(self) -> ApiClientConfig {
        self.config
    }
}

/// Bearer-authenticated GET client for the API
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
    token: TokenManager,
    rate_limiter: Option<RateLimiter>,
}

impl ApiClient {
    /// Create a new API client with the given credentials
    pub fn new(
        config: ApiClientConfig,
        refresh_token: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("hubspot-tap/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        let token = TokenManager::new(
            client.clone(),
            &config.base_url,
            refresh_token,
            client_id,
            client_secret,
        );
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Self {
            client,
            config,
            token,
            rate_limiter,
        }
    }

    /// Perform the initial token exchange
    pub async fn authenticate(&self) -> Result<()> {
        self.token.refresh().await?;
        Ok(())
    }

    /// Get the token manager
    pub fn token(&self) -> &TokenManager {
        &self.token
    }

    /// Make a GET request and parse the JSON response body
    pub async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        let url = self.build_url(path);
        let max_attempts = self.config.max_attempts.max(1);

        let mut attempt = 0;
        let mut refreshed = false;
        let mut last_error: Option<Error> = None;

        while attempt < max_attempts {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let bearer = self.token.bearer().await?;
            let mut req = self.client.get(&url).bearer_auth(bearer);
            if !params.is_empty() {
                req = req.query(params);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::UNAUTHORIZED {
                        if refreshed {
                            // token was already renewed once for this request
                            return Err(Error::auth(
                                "request unauthorized after token refresh",
                            ));
                        }
                        warn!("401 response, refreshing access token");
                        self.token.refresh().await?;
                        refreshed = true;
                        // one immediate retry with the new token, no backoff
                        continue;
                    }

                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        last_error = Some(Error::http_status(status.as_u16(), body));
                        attempt += 1;
                        if attempt < max_attempts {
                            let delay = self.calculate_backoff(attempt - 1);
                            warn!(
                                "GET {url} failed with {}, attempt {attempt}/{max_attempts}, retrying in {delay:?}",
                                status.as_u16()
                            );
                            tokio::time::sleep(delay).await;
                        }
                        continue;
                    }

                    debug!("GET {url} succeeded");
                    return response.json().await.map_err(Error::Http);
                }
                Err(e) => {
                    last_error = Some(if e.is_timeout() {
                        Error::Timeout {
                            timeout_ms: self.config.timeout.as_millis() as u64,
                        }
                    } else {
                        Error::Http(e)
                    });
                    attempt += 1;
                    if attempt < max_attempts {
                        let delay = self.calculate_backoff(attempt - 1);
                        warn!(
                            "GET {url} errored, attempt {attempt}/{max_attempts}, retrying in {delay:?}"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(Error::MaxRetriesExceeded { max_attempts }))
    }

    /// Single rate-limited GET used as an existence probe; no retry
    pub async fn probe(&self, path: &str) -> Result<()> {
        let url = self.build_url(path);

        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let bearer = self.token.bearer().await?;
        let response = self.client.get(&url).bearer_auth(bearer).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::http_status(status.as_u16(), body))
        }
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        std::cmp::min(
            self.config.initial_backoff.saturating_mul(factor),
            self.config.max_backoff,
        )
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}
