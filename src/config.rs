//! Tap configuration
//!
//! The config file is a flat JSON document supplied by the caller:
//!
//! ```json
//! {
//!   "refresh_token": "...",
//!   "client_id": "...",
//!   "client_secret": "...",
//!   "start_date": "2021-01-01T00:00:00Z",
//!   "end_date": "2021-02-01T00:00:00Z",
//!   "properties": { "contacts": ["hs_calculated_form_submissions"] }
//! }
//! ```
//!
//! `end_date` is optional and defaults to "now", resolved once per run.

use crate::error::{Error, Result};
use crate::sync::SyncWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Default page size for the offset-based v1/v2 endpoints
pub const DEFAULT_LIMIT: u32 = 250;

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Credentials, sync window and per-stream field selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// OAuth refresh token
    pub refresh_token: String,

    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Inclusive lower bound of the sync window
    pub start_date: DateTime<Utc>,

    /// Upper bound of the sync window; `None` means "now"
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,

    /// Requested property names per stream (keyed by stream name)
    #[serde(default)]
    pub properties: HashMap<String, Vec<String>>,

    /// Page size for the offset-based endpoints
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// API host override, used by tests against a mock server
    #[serde(default)]
    pub base_url: Option<String>,
}

impl TapConfig {
    /// Load config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parse config from a JSON string and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields are present and non-empty
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("refresh_token", &self.refresh_token),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ] {
            if value.is_empty() {
                return Err(Error::missing_field(field));
            }
        }
        if self.limit == 0 {
            return Err(Error::config("limit must be greater than zero"));
        }
        Ok(())
    }

    /// Resolve the sync window, substituting "now" for a missing end date
    pub fn window(&self) -> SyncWindow {
        SyncWindow::new(self.start_date, self.end_date.unwrap_or_else(Utc::now))
    }

    /// Requested properties for a stream, empty when unconfigured
    pub fn properties_for(&self, stream: &str) -> &[String] {
        self.properties.get(stream).map_or(&[], Vec::as_slice)
    }
}
