//! Sync window and accumulator context

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Half-open sync window: values strictly after `start` and at or before
/// `end` are in range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    /// Exclusive lower bound
    pub start: DateTime<Utc>,
    /// Inclusive upper bound
    pub end: DateTime<Utc>,
}

impl SyncWindow {
    /// Create a new window
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Check whether a timestamp falls inside the window
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts > self.start && ts <= self.end
    }
}

/// Cross-stream accumulators for one run
///
/// Created empty at tap start, written only while contacts are traversed,
/// read by the two dependent streams, and dropped with the run. Nothing
/// here is persisted: a fresh process re-derives both sets from scratch.
#[derive(Debug, Default)]
pub struct SyncContext {
    /// Form GUIDs discovered in contact records
    pub form_guids: BTreeSet<String>,
    /// Contact ids whose analytics timestamps fall inside the window,
    /// in discovery order
    pub event_contact_ids: Vec<String>,
}

impl SyncContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }
}
