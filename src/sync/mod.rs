//! Per-run sync context and the cross-stream dependency tracker
//!
//! While the contacts stream is traversed, every record is inspected for
//! two things: form GUIDs embedded in
//! `properties.hs_calculated_form_submissions`, and analytics timestamps
//! that place the contact inside the sync window. The accumulated sets
//! drive the `submissions` and `contacts_events` streams, which must run
//! after contacts within the same run.

mod context;
mod tracker;

pub use context::{SyncContext, SyncWindow};
pub use tracker::{observe_contact, parse_form_guids};
