//! Tap orchestration
//!
//! [`Tap`] owns the API client, the per-run accumulator context and the
//! bookmark state, and drives one stream at a time into a sink.
//!
//! Sequencing: `sync_all` runs the full set in dependency-safe order.
//! `sync_stream` leaves ordering to the caller; running `submissions` or
//! `contacts_events` without a prior contacts traversal in the same run
//! syncs only what the forms endpoint (respectively, nothing) provides.

use crate::config::TapConfig;
use crate::error::Result;
use crate::http::{ApiClient, ApiClientConfig};
use crate::pagination;
use crate::replication;
use crate::sink::Sink;
use crate::state::StateManager;
use crate::streams::{StreamDescriptor, StreamId};
use crate::sync::{self, SyncContext, SyncWindow};
use futures::{pin_mut, StreamExt};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// The extraction engine
pub struct Tap {
    client: ApiClient,
    config: TapConfig,
    window: SyncWindow,
    ctx: SyncContext,
    state: StateManager,
}

impl Tap {
    /// Build a tap from config, performing the initial token exchange
    pub async fn connect(config: TapConfig, state: StateManager) -> Result<Self> {
        let api_config = match &config.base_url {
            Some(url) => ApiClientConfig::builder().base_url(url).build(),
            None => ApiClientConfig::default(),
        };
        Self::connect_with(config, state, api_config).await
    }

    /// Build a tap with an explicit API client configuration
    pub async fn connect_with(
        config: TapConfig,
        state: StateManager,
        api_config: ApiClientConfig,
    ) -> Result<Self> {
        let client = ApiClient::new(
            api_config,
            &config.refresh_token,
            &config.client_id,
            &config.client_secret,
        );
        client.authenticate().await?;

        let window = config.window();
        Ok(Self {
            client,
            config,
            window,
            ctx: SyncContext::new(),
            state,
        })
    }

    /// The per-run accumulator context
    pub fn context(&self) -> &SyncContext {
        &self.ctx
    }

    /// The bookmark state
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Sync every stream in dependency-safe order
    pub async fn sync_all(&mut self, sink: &mut dyn Sink) -> Result<()> {
        for stream in StreamId::ALL {
            self.sync_stream(stream, sink).await?;
        }
        Ok(())
    }

    /// Sync one stream into the sink
    pub async fn sync_stream(&mut self, stream: StreamId, sink: &mut dyn Sink) -> Result<()> {
        info!(stream = %stream, "starting sync");

        match stream {
            StreamId::Contacts => self.sync_contacts(sink).await?,
            StreamId::Submissions => self.sync_submissions(sink).await?,
            StreamId::ContactsEvents => self.sync_contacts_events(sink).await?,
            _ => self.sync_declarative(stream, sink).await?,
        }

        if let Some(bookmark) = self.state.bookmark(stream.as_str()) {
            sink.emit_state(stream, bookmark).await?;
        }
        self.state.save().await?;

        info!(stream = %stream, "completed sync");
        Ok(())
    }

    /// Walk a single declarative endpoint
    async fn sync_declarative(&mut self, stream: StreamId, sink: &mut dyn Sink) -> Result<()> {
        let descriptor = StreamDescriptor::for_stream(stream);
        let params = descriptor.params(&self.config, &self.window);

        let records = pagination::records(&self.client, &descriptor, params);
        pin_mut!(records);

        while let Some(record) = records.next().await {
            let record = record?;
            let replication_value = replication::extract(&record, &descriptor);
            if replication_value.is_none() && !descriptor.replication_path.is_empty() {
                debug!(stream = %stream, "record without replication value");
            }
            if let Some(value) = replication_value {
                self.state.advance(stream.as_str(), value);
            }
            sink.emit(stream, &record, replication_value).await?;
        }
        Ok(())
    }

    /// Contacts traversal; feeds the cross-stream accumulators
    async fn sync_contacts(&mut self, sink: &mut dyn Sink) -> Result<()> {
        let stream = StreamId::Contacts;
        let descriptor = StreamDescriptor::for_stream(stream);
        let params = descriptor.params(&self.config, &self.window);

        let records = pagination::records(&self.client, &descriptor, params);
        pin_mut!(records);

        while let Some(record) = records.next().await {
            let record = record?;
            sync::observe_contact(&mut self.ctx, &record, &self.window);

            let replication_value = replication::extract(&record, &descriptor);
            if let Some(value) = replication_value {
                self.state.advance(stream.as_str(), value);
            }
            sink.emit(stream, &record, replication_value).await?;
        }

        info!(
            form_guids = self.ctx.form_guids.len(),
            event_contacts = self.ctx.event_contact_ids.len(),
            "contacts traversal accumulated dependencies"
        );
        Ok(())
    }

    /// Submissions for every known form
    ///
    /// Covers both the forms a contact actually submitted and every form
    /// the forms endpoint currently lists. GUIDs that fail the existence
    /// probe are skipped; some historical GUIDs are permanently invalid.
    async fn sync_submissions(&mut self, sink: &mut dyn Sink) -> Result<()> {
        let stream = StreamId::Submissions;
        let mut guids = self.ctx.form_guids.clone();
        guids.extend(self.list_form_guids().await?);

        for guid in guids {
            let descriptor = StreamDescriptor::submissions(&guid);
            if let Err(e) = self.client.probe(&descriptor.path).await {
                warn!(guid = %guid, error = %e, "skipping form that failed the probe");
                continue;
            }

            let params = descriptor.params(&self.config, &self.window);
            let records = pagination::records(&self.client, &descriptor, params);
            pin_mut!(records);

            while let Some(record) = records.next().await {
                sink.emit(stream, &record?, None).await?;
            }
        }
        Ok(())
    }

    /// Events for every contact flagged during the contacts traversal
    async fn sync_contacts_events(&mut self, sink: &mut dyn Sink) -> Result<()> {
        let stream = StreamId::ContactsEvents;
        let descriptor = StreamDescriptor::for_stream(stream);
        let base_params = descriptor.params(&self.config, &self.window);
        let contact_ids = self.ctx.event_contact_ids.clone();

        for contact_id in contact_ids {
            let mut params = base_params.clone();
            params.push(("objectId".to_string(), contact_id));

            let records = pagination::records(&self.client, &descriptor, params);
            pin_mut!(records);

            while let Some(record) = records.next().await {
                sink.emit(stream, &record?, None).await?;
            }
        }
        Ok(())
    }

    /// List every form GUID from the forms endpoint
    async fn list_form_guids(&self) -> Result<BTreeSet<String>> {
        let descriptor = StreamDescriptor::for_stream(StreamId::Forms);
        let records = pagination::records(&self.client, &descriptor, Vec::new());
        pin_mut!(records);

        let mut guids = BTreeSet::new();
        while let Some(record) = records.next().await {
            if let Some(guid) = record?.get("guid").and_then(serde_json::Value::as_str) {
                guids.insert(guid.to_string());
            }
        }
        Ok(guids)
    }
}

impl std::fmt::Debug for Tap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tap")
            .field("window", &self.window)
            .field("form_guids", &self.ctx.form_guids.len())
            .field("event_contact_ids", &self.ctx.event_contact_ids.len())
            .finish_non_exhaustive()
    }
}
