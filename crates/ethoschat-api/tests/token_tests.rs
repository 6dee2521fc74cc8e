use std::time::Duration;

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ethoschat_api::{ApiError, TokenProvider};

fn provider_for(server: &MockServer) -> TokenProvider {
    TokenProvider::new(
        reqwest::Client::new(),
        format!("{}/identity/token", server.uri()),
        "test-key".to_string(),
    )
}

fn issuer_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "access_token": "tok-123",
        "token_type": "Bearer",
        "expires_in": 3600,
    }))
}

#[tokio::test]
async fn token_is_reused_within_the_window() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .and(body_string_contains("apikey=test-key"))
        .and(body_string_contains(
            "grant_type=urn%3Aibm%3Aparams%3Aoauth%3Agrant-type%3Aapikey",
        ))
        .respond_with(issuer_ok())
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);

    let first = provider.bearer_token().await.unwrap();
    let second = provider.bearer_token().await.unwrap();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn expired_window_triggers_a_fresh_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(issuer_ok())
        .expect(2)
        .mount(&server)
        .await;

    let provider = provider_for(&server).with_ttl(Duration::ZERO);

    provider.bearer_token().await.unwrap();
    provider.bearer_token().await.unwrap();
}

#[tokio::test]
async fn invalidate_forces_a_fresh_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(issuer_ok())
        .expect(2)
        .mount(&server)
        .await;

    let provider = provider_for(&server);

    provider.bearer_token().await.unwrap();
    assert!(provider.has_fresh_token().await);

    provider.invalidate().await;
    assert!(!provider.has_fresh_token().await);

    provider.bearer_token().await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);

    let err = provider.bearer_token().await.unwrap_err();
    assert!(matches!(err, ApiError::Auth { .. }), "got {:?}", err);
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn malformed_issuer_body_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);

    let err = provider.bearer_token().await.unwrap_err();
    assert!(matches!(err, ApiError::Auth { .. }), "got {:?}", err);
}
