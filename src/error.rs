//! Error types for the tap
//!
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! The variants fall into four classes:
//! - auth failures (`Auth`, `TokenRefresh`) abort the run
//! - API failures (`Http`, `HttpStatus`, `Timeout`, `MaxRetriesExceeded`,
//!   `JsonParse`) abort the current stream after the retry budget is spent
//! - config failures (`Config`, `MissingConfigField`, `UnknownStream`) abort
//!   at startup
//! - a missing replication value is *not* an error; records are still
//!   emitted with `None` and only the bookmark is affected

use thiserror::Error;

/// The main error type for the tap
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Unknown stream: {stream}")]
    UnknownStream { stream: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Token refresh failed: {message}")]
    TokenRefresh { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_attempts}) exceeded")]
    MaxRetriesExceeded { max_attempts: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // State / I/O Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an unknown stream error
    pub fn unknown_stream(stream: impl Into<String>) -> Self {
        Self::UnknownStream {
            stream: stream.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a token refresh error
    pub fn token_refresh(message: impl Into<String>) -> Self {
        Self::TokenRefresh {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Check if this error is fatal for the whole run rather than one stream
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth { .. } | Error::TokenRefresh { .. })
    }

    /// Check if this error is retryable by the HTTP client
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => *status != 401,
            _ => false,
        }
    }
}

/// Result type alias for the tap
pub type Result<T> = std::result::Result<T, Error>;
