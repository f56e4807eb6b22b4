//! Bookmark state
//!
//! A bookmark is the per-stream high-water mark over the replication
//! values observed during a run. State is persisted as JSON with an
//! atomic tmp-file + rename; an in-memory mode backs the tests.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Persisted tap state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// Highest replication value seen per stream
    #[serde(default)]
    pub bookmarks: HashMap<String, DateTime<Utc>>,
}

impl State {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bookmark for a stream
    pub fn bookmark(&self, stream: &str) -> Option<DateTime<Utc>> {
        self.bookmarks.get(stream).copied()
    }

    /// Advance a stream's bookmark; ignores values at or below the
    /// current mark. Returns whether the bookmark moved.
    pub fn advance(&mut self, stream: &str, value: DateTime<Utc>) -> bool {
        match self.bookmarks.get(stream) {
            Some(current) if *current >= value => false,
            _ => {
                self.bookmarks.insert(stream.to_string(), value);
                true
            }
        }
    }
}

/// Loads, tracks and persists bookmark state
#[derive(Debug)]
pub struct StateManager {
    /// State file path; `None` means in-memory only
    path: Option<PathBuf>,
    state: State,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: State::new(),
        }
    }

    /// Create a state manager backed by a file, loading existing state
    /// if the file is present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("failed to read state file: {e}")))?;
            serde_json::from_str(&contents)
                .map_err(|e| Error::state(format!("failed to parse state file: {e}")))?
        } else {
            State::new()
        };

        Ok(Self {
            path: Some(path),
            state,
        })
    }

    /// Current bookmark for a stream
    pub fn bookmark(&self, stream: &str) -> Option<DateTime<Utc>> {
        self.state.bookmark(stream)
    }

    /// Advance a stream's bookmark
    pub fn advance(&mut self, stream: &str, value: DateTime<Utc>) -> bool {
        self.state.advance(stream, value)
    }

    /// Persist state; a no-op in memory mode
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let contents = serde_json::to_string_pretty(&self.state)
            .map_err(|e| Error::state(format!("failed to serialize state: {e}")))?;

        // write to a temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("failed to write state file: {e}")))?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::state(format!("failed to rename state file: {e}")))?;

        Ok(())
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }
}
