//! Record sinks
//!
//! The tap pushes `(record, replication_value)` pairs into a [`Sink`] in
//! API response order, one record at a time; streams are never buffered
//! whole. Bookmark updates are surfaced through `emit_state` after each
//! stream completes.

use crate::error::{Error, Result};
use crate::streams::StreamId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io::Write;

/// Receives extracted records and bookmark updates
#[async_trait]
pub trait Sink: Send {
    /// Receive one record with its replication value
    async fn emit(
        &mut self,
        stream: StreamId,
        record: &Value,
        replication_value: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Receive the stream's bookmark once the stream completes
    async fn emit_state(&mut self, _stream: StreamId, _bookmark: DateTime<Utc>) -> Result<()> {
        Ok(())
    }
}

/// Writes records as JSON lines, one message per record
///
/// ```text
/// {"type":"RECORD","stream":"contacts","record":{...},"replication_value":"..."}
/// {"type":"STATE","stream":"contacts","bookmark":"..."}
/// ```
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl JsonLinesSink<std::io::Stdout> {
    /// Create a sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Create a sink writing to the given writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_message(&mut self, message: &Value) -> Result<()> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n").map_err(Error::Io)
    }
}

#[async_trait]
impl<W: Write + Send> Sink for JsonLinesSink<W> {
    async fn emit(
        &mut self,
        stream: StreamId,
        record: &Value,
        replication_value: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.write_message(&serde_json::json!({
            "type": "RECORD",
            "stream": stream.as_str(),
            "record": record,
            "replication_value": replication_value.map(|v| v.to_rfc3339()),
        }))
    }

    async fn emit_state(&mut self, stream: StreamId, bookmark: DateTime<Utc>) -> Result<()> {
        self.write_message(&serde_json::json!({
            "type": "STATE",
            "stream": stream.as_str(),
            "bookmark": bookmark.to_rfc3339(),
        }))
    }
}

/// In-memory sink used by tests
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Every emitted record, in order
    pub records: Vec<(StreamId, Value, Option<DateTime<Utc>>)>,
    /// Every emitted bookmark, in order
    pub bookmarks: Vec<(StreamId, DateTime<Utc>)>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records emitted for one stream
    pub fn records_for(&self, stream: StreamId) -> Vec<&Value> {
        self.records
            .iter()
            .filter(|(s, _, _)| *s == stream)
            .map(|(_, record, _)| record)
            .collect()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn emit(
        &mut self,
        stream: StreamId,
        record: &Value,
        replication_value: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.records.push((stream, record.clone(), replication_value));
        Ok(())
    }

    async fn emit_state(&mut self, stream: StreamId, bookmark: DateTime<Utc>) -> Result<()> {
        self.bookmarks.push((stream, bookmark));
        Ok(())
    }
}
