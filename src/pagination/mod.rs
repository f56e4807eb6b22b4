//! Endpoint pagination
//!
//! [`records`] walks one endpoint and yields a flat, lazy sequence of raw
//! records across pages. The sequence is finite and not restartable; the
//! only suspension points are immediately before each HTTP call.
//!
//! Cursor convention, which varies per endpoint:
//! - the current cursor is injected under the descriptor's offset key and
//!   the parameter is dropped again right after the request
//! - a descriptor without a `data_field` treats the whole response body
//!   as the record array and never paginates
//! - the next cursor comes from `paging.next.after` when the response
//!   carries a `paging` object, otherwise from the offset key at the top
//!   level of the response
//! - a page with records but no discoverable cursor still yields its
//!   records before the sequence ends (last page semantics)

use crate::error::Result;
use crate::http::ApiClient;
use crate::streams::StreamDescriptor;
use futures::stream::{self, Stream};
use serde_json::Value;
use std::collections::VecDeque;
use tracing::debug;

#[cfg(test)]
mod tests;

/// Lazily yield every record of an endpoint, page by page
pub fn records<'a>(
    client: &'a ApiClient,
    descriptor: &'a StreamDescriptor,
    params: Vec<(String, String)>,
) -> impl Stream<Item = Result<Value>> + 'a {
    let state = PageState {
        client,
        descriptor,
        params,
        cursor: None,
        pending: VecDeque::new(),
        exhausted: false,
    };

    stream::try_unfold(state, |mut state| async move {
        loop {
            if let Some(record) = state.pending.pop_front() {
                return Ok(Some((record, state)));
            }
            if state.exhausted {
                return Ok(None);
            }
            state.fetch_next_page().await?;
        }
    })
}

struct PageState<'a> {
    client: &'a ApiClient,
    descriptor: &'a StreamDescriptor,
    params: Vec<(String, String)>,
    cursor: Option<String>,
    pending: VecDeque<Value>,
    exhausted: bool,
}

impl PageState<'_> {
    async fn fetch_next_page(&mut self) -> Result<()> {
        if let (Some(cursor), Some(offset_key)) = (self.cursor.take(), self.descriptor.offset_key)
        {
            self.params.push((offset_key.to_string(), cursor));
        }

        let mut body = self.client.get(&self.descriptor.path, &self.params).await?;

        // the cursor is only valid for the request that carried it
        if let Some(offset_key) = self.descriptor.offset_key {
            self.params.retain(|(key, _)| key != offset_key);
        }

        let Some(data_field) = self.descriptor.data_field else {
            // whole body is the record array; single-page contract
            if let Value::Array(items) = body {
                self.pending.extend(items);
            }
            self.exhausted = true;
            return Ok(());
        };

        match body.get_mut(data_field).map(Value::take) {
            Some(Value::Array(items)) if !items.is_empty() => {
                debug!(
                    stream = %self.descriptor.stream,
                    count = items.len(),
                    "fetched page"
                );
                self.pending.extend(items);
            }
            _ => {
                self.exhausted = true;
                return Ok(());
            }
        }

        self.cursor = self
            .descriptor
            .offset_key
            .and_then(|offset_key| next_cursor(&body, offset_key));
        if self.cursor.is_none() {
            self.exhausted = true;
        }
        Ok(())
    }
}

/// Derive the next cursor from a response body
fn next_cursor(body: &Value, offset_key: &str) -> Option<String> {
    let raw = if body.get("paging").is_some() {
        body.pointer("/paging/next/after")
    } else {
        body.get(offset_key)
    }?;

    match raw {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        // a zero offset means the endpoint has nothing further
        Value::Number(n) if n.as_i64() != Some(0) => Some(n.to_string()),
        _ => None,
    }
}
