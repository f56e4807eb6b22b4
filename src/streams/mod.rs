//! Stream identities and routing
//!
//! The tap serves a fixed, closed set of nine streams. Every stream maps
//! to a [`StreamDescriptor`] carrying its endpoint path, pagination
//! convention and replication path; see the descriptor table for the
//! exact per-endpoint contract.

mod descriptor;

pub use descriptor::{StreamDescriptor, EVENT_DATE_FORMAT};


use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Logical stream identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamId {
    Companies,
    Contacts,
    Engagements,
    DealPipelines,
    Deals,
    EmailEvents,
    Forms,
    Submissions,
    ContactsEvents,
}

impl StreamId {
    /// All streams in dependency-safe sync order
    ///
    /// `submissions` and `contacts_events` read the accumulators filled
    /// during the contacts traversal, so contacts must come first.
    pub const ALL: [StreamId; 9] = [
        StreamId::Companies,
        StreamId::Contacts,
        StreamId::Engagements,
        StreamId::DealPipelines,
        StreamId::Deals,
        StreamId::EmailEvents,
        StreamId::Forms,
        StreamId::Submissions,
        StreamId::ContactsEvents,
    ];

    /// The stream's wire name
    pub fn as_str(self) -> &'static str {
        match self {
            StreamId::Companies => "companies",
            StreamId::Contacts => "contacts",
            StreamId::Engagements => "engagements",
            StreamId::DealPipelines => "deal_pipelines",
            StreamId::Deals => "deals",
            StreamId::EmailEvents => "email_events",
            StreamId::Forms => "forms",
            StreamId::Submissions => "submissions",
            StreamId::ContactsEvents => "contacts_events",
        }
    }

    /// Check if the stream is driven by the cross-stream accumulators
    pub fn is_dependency_driven(self) -> bool {
        matches!(self, StreamId::Submissions | StreamId::ContactsEvents)
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "companies" => Ok(StreamId::Companies),
            "contacts" => Ok(StreamId::Contacts),
            "engagements" => Ok(StreamId::Engagements),
            "deal_pipelines" => Ok(StreamId::DealPipelines),
            "deals" => Ok(StreamId::Deals),
            "email_events" => Ok(StreamId::EmailEvents),
            "forms" => Ok(StreamId::Forms),
            "submissions" => Ok(StreamId::Submissions),
            "contacts_events" => Ok(StreamId::ContactsEvents),
            other => Err(Error::unknown_stream(other)),
        }
    }
}

/// How a stream's replication value is encoded in its records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationFormat {
    /// Epoch milliseconds, as a JSON number or numeric string
    EpochMillis,
    /// ISO-8601 / RFC 3339 string
    Iso8601,
    /// The stream carries no replication value
    None,
}
