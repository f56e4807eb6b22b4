//! Per-stream endpoint descriptors
//!
//! The endpoint table is a fixed contract:
//!
//! | stream | path | data_field | offset_key | replication path |
//! |---|---|---|---|---|
//! | companies | /companies/v2/companies/paged | companies | offset | properties.hs_lastmodifieddate.timestamp |
//! | contacts | /crm/v3/objects/contacts | results | after | updatedAt |
//! | engagements | /engagements/v1/engagements/paged | results | offset | engagement.lastUpdated |
//! | deal_pipelines | /crm-pipelines/v1/pipelines/deals | results | - | updatedAt |
//! | deals | /deals/v1/deal/paged | deals | offset | properties.hs_lastmodifieddate.timestamp |
//! | email_events | /email/public/v1/events | events | offset | created |
//! | forms | /forms/v2/forms | - | - | updatedAt |
//! | submissions | /form-integrations/v1/submissions/forms/{guid} | results | after | - |
//! | contacts_events | /events/v3/events | results | after | - |
//!
//! Contacts timestamps are ISO-8601; every other replicated stream uses
//! epoch milliseconds.

use super::{ReplicationFormat, StreamId};
use crate::config::TapConfig;
use crate::replication::datetime_to_millis;
use crate::sync::SyncWindow;

/// Timestamp format for the `/events/v3/events` window parameters
pub const EVENT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Static description of one stream's endpoint and pagination convention
#[derive(Debug, Clone)]
pub struct StreamDescriptor {
    /// Stream this descriptor belongs to
    pub stream: StreamId,
    /// Endpoint path relative to the API host
    pub path: String,
    /// JSON key holding the record array; `None` means the whole response
    /// body is the array (single-page contract)
    pub data_field: Option<&'static str>,
    /// Request/response field carrying the pagination cursor
    pub offset_key: Option<&'static str>,
    /// Key path into a record for the replication timestamp
    pub replication_path: &'static [&'static str],
    /// Encoding of the replication timestamp
    pub replication_format: ReplicationFormat,
}

impl StreamDescriptor {
    /// Look up the descriptor for a stream
    ///
    /// For `submissions` the returned path still contains the `{guid}`
    /// placeholder; use [`StreamDescriptor::submissions`] for a concrete
    /// form.
    pub fn for_stream(stream: StreamId) -> Self {
        match stream {
            StreamId::Companies => Self {
                stream,
                path: "/companies/v2/companies/paged".to_string(),
                data_field: Some("companies"),
                offset_key: Some("offset"),
                replication_path: &["properties", "hs_lastmodifieddate", "timestamp"],
                replication_format: ReplicationFormat::EpochMillis,
            },
            StreamId::Contacts => Self {
                stream,
                path: "/crm/v3/objects/contacts".to_string(),
                data_field: Some("results"),
                offset_key: Some("after"),
                replication_path: &["updatedAt"],
                replication_format: ReplicationFormat::Iso8601,
            },
            StreamId::Engagements => Self {
                stream,
                path: "/engagements/v1/engagements/paged".to_string(),
                data_field: Some("results"),
                offset_key: Some("offset"),
                replication_path: &["engagement", "lastUpdated"],
                replication_format: ReplicationFormat::EpochMillis,
            },
            StreamId::DealPipelines => Self {
                stream,
                path: "/crm-pipelines/v1/pipelines/deals".to_string(),
                data_field: Some("results"),
                offset_key: None,
                replication_path: &["updatedAt"],
                replication_format: ReplicationFormat::EpochMillis,
            },
            StreamId::Deals => Self {
                stream,
                path: "/deals/v1/deal/paged".to_string(),
                data_field: Some("deals"),
                offset_key: Some("offset"),
                replication_path: &["properties", "hs_lastmodifieddate", "timestamp"],
                replication_format: ReplicationFormat::EpochMillis,
            },
            StreamId::EmailEvents => Self {
                stream,
                path: "/email/public/v1/events".to_string(),
                data_field: Some("events"),
                offset_key: Some("offset"),
                replication_path: &["created"],
                replication_format: ReplicationFormat::EpochMillis,
            },
            StreamId::Forms => Self {
                stream,
                path: "/forms/v2/forms".to_string(),
                data_field: None,
                offset_key: None,
                replication_path: &["updatedAt"],
                replication_format: ReplicationFormat::EpochMillis,
            },
            StreamId::Submissions => Self {
                stream,
                path: "/form-integrations/v1/submissions/forms/{guid}".to_string(),
                data_field: Some("results"),
                offset_key: Some("after"),
                replication_path: &[],
                replication_format: ReplicationFormat::None,
            },
            StreamId::ContactsEvents => Self {
                stream,
                path: "/events/v3/events".to_string(),
                data_field: Some("results"),
                offset_key: Some("after"),
                replication_path: &[],
                replication_format: ReplicationFormat::None,
            },
        }
    }

    /// Descriptor for the submissions of one form
    pub fn submissions(guid: &str) -> Self {
        let mut descriptor = Self::for_stream(StreamId::Submissions);
        descriptor.path = format!("/form-integrations/v1/submissions/forms/{guid}");
        descriptor
    }

    /// Base request parameters for this stream
    ///
    /// Parameter names and values mirror each endpoint's contract; the
    /// requested property list is repeated once per property. For
    /// `contacts_events` the per-contact `objectId` is appended by the
    /// caller.
    pub fn params(&self, config: &TapConfig, window: &SyncWindow) -> Vec<(String, String)> {
        let limit = config.limit;
        let mut params: Vec<(String, String)> = Vec::new();

        match self.stream {
            StreamId::Companies => {
                params.push(("limit".into(), limit.to_string()));
                push_properties(&mut params, config, self.stream);
            }
            StreamId::Contacts => {
                // v3 contacts caps the page size at 100
                params.push(("limit".into(), "100".into()));
                push_properties(&mut params, config, self.stream);
            }
            StreamId::Engagements => {
                params.push(("limit".into(), limit.to_string()));
            }
            StreamId::Deals => {
                params.push(("count".into(), limit.to_string()));
                params.push(("includeAssociations".into(), "true".into()));
                push_properties(&mut params, config, self.stream);
                params.push(("limit".into(), limit.to_string()));
            }
            StreamId::EmailEvents => {
                params.push((
                    "startTimestamp".into(),
                    datetime_to_millis(window.start).to_string(),
                ));
                params.push((
                    "endTimestamp".into(),
                    datetime_to_millis(window.end).to_string(),
                ));
            }
            StreamId::Submissions => {
                // maximum limit for this endpoint is 50
                params.push(("limit".into(), "50".into()));
            }
            StreamId::ContactsEvents => {
                params.push(("limit".into(), limit.to_string()));
                params.push(("objectType".into(), "contact".into()));
                params.push((
                    "occurredBefore".into(),
                    window.end.format(EVENT_DATE_FORMAT).to_string(),
                ));
                params.push((
                    "occurredAfter".into(),
                    window.start.format(EVENT_DATE_FORMAT).to_string(),
                ));
            }
            StreamId::DealPipelines | StreamId::Forms => {}
        }

        params
    }
}

fn push_properties(params: &mut Vec<(String, String)>, config: &TapConfig, stream: StreamId) {
    for property in config.properties_for(stream.as_str()) {
        params.push(("properties".into(), property.clone()));
    }
}
