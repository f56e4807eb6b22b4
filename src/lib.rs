//! # hubspot-tap
//!
//! An incremental extraction tap for the HubSpot CRM API.
//!
//! The tap walks nine paginated, heterogeneous endpoints, derives a
//! per-record replication timestamp for incremental bookmarking, and
//! tracks two cross-stream dependencies discovered while traversing
//! contacts: form GUIDs (feeding the `submissions` stream) and contact
//! ids flagged by analytics timestamps (feeding the `contacts_events`
//! stream).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hubspot_tap::{JsonLinesSink, StateManager, Tap, TapConfig};
//!
//! #[tokio::main]
//! async fn main() -> hubspot_tap::Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let state = StateManager::from_file("state.json")?;
//!
//!     let mut tap = Tap::connect(config, state).await?;
//!     let mut sink = JsonLinesSink::stdout();
//!     tap.sync_all(&mut sink).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Tap (orchestration)                  │
//! │  sync_all / sync_stream(stream, sink)                   │
//! └─────────────────────────────────────────────────────────┘
//!               │
//! ┌──────────┬──┴────────┬───────────────┬─────────────────┐
//! │   Auth   │   HTTP    │   Paginate    │  Cross-stream   │
//! ├──────────┼───────────┼───────────────┼─────────────────┤
//! │ Refresh  │ GET       │ offset /      │ form GUIDs      │
//! │ exchange │ Retry     │ paging.next.  │ event contacts  │
//! │ 401 re-  │ Backoff   │ after cursor  │ (per-run        │
//! │ auth     │ Rate limit│ single-page   │  SyncContext)   │
//! └──────────┴───────────┴───────────────┴─────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Tap configuration
pub mod config;

/// OAuth token management
pub mod auth;

/// Rate-limited HTTP client
pub mod http;

/// Endpoint pagination
pub mod pagination;

/// Replication value extraction
pub mod replication;

/// Record sinks
pub mod sink;

/// Bookmark state
pub mod state;

/// Stream identities and descriptors
pub mod streams;

/// Per-run sync context and dependency tracking
pub mod sync;

/// Tap orchestration
pub mod tap;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::TapConfig;
pub use error::{Error, Result};
pub use sink::{JsonLinesSink, MemorySink, Sink};
pub use state::StateManager;
pub use streams::{StreamDescriptor, StreamId};
pub use tap::Tap;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
