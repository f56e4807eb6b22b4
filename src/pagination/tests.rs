//! Tests for the paginator

use super::records;
use crate::http::{ApiClient, ApiClientConfig};
use crate::streams::{StreamDescriptor, StreamId};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> ApiClient {
    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1"
        })))
        .mount(server)
        .await;

    let config = ApiClientConfig::builder()
        .base_url(server.uri())
        .max_attempts(2)
        .backoff(Duration::from_millis(1), Duration::from_millis(10))
        .no_rate_limit()
        .build();
    ApiClient::new(config, "rt", "ci", "cs")
}

async fn collect(client: &ApiClient, descriptor: &StreamDescriptor) -> Vec<Value> {
    records(client, descriptor, Vec::new())
        .try_collect()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_offset_pagination_yields_all_pages_in_order() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server).await;

    // page 2, matched only when the cursor is echoed back
    Mock::given(method("GET"))
        .and(path("/companies/v2/companies/paged"))
        .and(query_param("offset", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "companies": [{"companyId": 3}],
            "has-more": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // page 1
    Mock::given(method("GET"))
        .and(path("/companies/v2/companies/paged"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "companies": [{"companyId": 1}, {"companyId": 2}],
            "has-more": true,
            "offset": 50
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = StreamDescriptor::for_stream(StreamId::Companies);
    let all = collect(&client, &descriptor).await;

    let ids: Vec<i64> = all.iter().map(|r| r["companyId"].as_i64().unwrap()).collect();
    assert_eq!(ids, [1, 2, 3]);
}

#[tokio::test]
async fn test_paging_next_after_cursor() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/crm/v3/objects/contacts"))
        .and(query_param("after", "cursor-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "b"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/crm/v3/objects/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "a"}],
            "paging": {"next": {"after": "cursor-2"}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = StreamDescriptor::for_stream(StreamId::Contacts);
    let all = collect(&client, &descriptor).await;

    let ids: Vec<&str> = all.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["a", "b"]);
}

#[tokio::test]
async fn test_no_data_field_takes_whole_body_in_one_request() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/forms/v2/forms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"guid": "f1"},
            {"guid": "f2"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = StreamDescriptor::for_stream(StreamId::Forms);
    let all = collect(&client, &descriptor).await;
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_empty_data_array_terminates_without_records() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/engagements/v1/engagements/paged"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
            "offset": 999
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = StreamDescriptor::for_stream(StreamId::Engagements);
    let all = collect(&client, &descriptor).await;
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_missing_data_field_terminates() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/deals/v1/deal/paged"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "unexpected": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = StreamDescriptor::for_stream(StreamId::Deals);
    let all = collect(&client, &descriptor).await;
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_last_page_without_cursor_still_yields_records() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/email/public/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [{"id": "e1"}, {"id": "e2"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = StreamDescriptor::for_stream(StreamId::EmailEvents);
    let all = collect(&client, &descriptor).await;
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_paging_object_without_after_terminates() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/crm/v3/objects/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "a"}],
            "paging": {"prev": {"before": "0"}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = StreamDescriptor::for_stream(StreamId::Contacts);
    let all = collect(&client, &descriptor).await;
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_zero_offset_treated_as_no_cursor() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/email/public/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [{"id": "e1"}],
            "offset": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = StreamDescriptor::for_stream(StreamId::EmailEvents);
    let all = collect(&client, &descriptor).await;
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_descriptor_without_offset_key_is_single_page() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server).await;

    // offset in the body must be ignored: deal_pipelines never paginates
    Mock::given(method("GET"))
        .and(path("/crm-pipelines/v1/pipelines/deals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"pipelineId": "default"}],
            "offset": 10
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let descriptor = StreamDescriptor::for_stream(StreamId::DealPipelines);
    let all = collect(&client, &descriptor).await;
    assert_eq!(all.len(), 1);
}
