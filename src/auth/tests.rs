//! Tests for the token manager

use super::TokenManager;
use crate::error::Error;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn manager(base_url: &str) -> TokenManager {
    TokenManager::new(
        reqwest::Client::new(),
        base_url,
        "refresh-123",
        "client-abc",
        "secret-xyz",
    )
}

#[tokio::test]
async fn test_refresh_exchanges_refresh_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-123"))
        .and(body_string_contains("client_id=client-abc"))
        .and(body_string_contains("client_secret=secret-xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-1",
            "expires_in": 1800
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager(&mock_server.uri());
    let token = manager.refresh().await.unwrap();
    assert_eq!(token, "tok-1");
}

#[tokio::test]
async fn test_bearer_caches_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager(&mock_server.uri());
    assert_eq!(manager.bearer().await.unwrap(), "tok-1");
    // second call must hit the cache, not the endpoint
    assert_eq!(manager.bearer().await.unwrap(), "tok-1");
}

#[tokio::test]
async fn test_refresh_replaces_cached_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-1"
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-2"
        })))
        .mount(&mock_server)
        .await;

    let manager = manager(&mock_server.uri());
    assert_eq!(manager.refresh().await.unwrap(), "tok-1");
    assert_eq!(manager.refresh().await.unwrap(), "tok-2");
    assert_eq!(manager.bearer().await.unwrap(), "tok-2");
}

#[tokio::test]
async fn test_refresh_failure_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&mock_server)
        .await;

    let manager = manager(&mock_server.uri());
    let err = manager.refresh().await.unwrap_err();
    assert!(matches!(err, Error::TokenRefresh { .. }));
    assert!(err.to_string().contains("invalid_grant"));
}

#[tokio::test]
async fn test_refresh_rejects_response_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "bearer"
        })))
        .mount(&mock_server)
        .await;

    let manager = manager(&mock_server.uri());
    let err = manager.refresh().await.unwrap_err();
    assert!(matches!(err, Error::TokenRefresh { .. }));
}
