use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{ChatSession, TurnPhase};
use ethoschat_api::{ChatClient, TokenProvider};
use ethoschat_types::Role;

fn issuer_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "access_token": "tok-abc",
    }))
}

fn chat_ok(reply: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": reply}}]
    }))
}

async fn mock_backend() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(issuer_ok())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(chat_ok("hi"))
        .mount(&server)
        .await;

    server
}

fn session_for(server: &MockServer) -> ChatSession {
    let http = reqwest::Client::new();
    let provider = TokenProvider::new(
        http.clone(),
        format!("{}/identity/token", server.uri()),
        "test-key".to_string(),
    );
    let chat = ChatClient::new(http, format!("{}/chat", server.uri()));
    ChatSession::new(provider, chat)
}

#[tokio::test]
async fn turn_appends_user_then_assistant() {
    let server = mock_backend().await;
    let mut session = session_for(&server);

    let mut phases = Vec::new();
    let reply = session.run_turn("hello", |p| phases.push(p)).await;

    assert_eq!(reply, "hi");
    assert_eq!(session.message_count(), 2);
    assert_eq!(session.history()[0].role, Role::User);
    assert_eq!(session.history()[0].content, "hello");
    assert_eq!(session.history()[1].role, Role::Assistant);
    assert_eq!(session.history()[1].content, "hi");
    assert_eq!(
        phases,
        vec![
            TurnPhase::AwaitingToken,
            TurnPhase::AwaitingReply,
            TurnPhase::Idle
        ]
    );
}

#[tokio::test]
async fn warm_token_skips_the_token_phase() {
    let server = mock_backend().await;
    let mut session = session_for(&server);

    session.warm_up().await.unwrap();

    let mut phases = Vec::new();
    session.run_turn("hello", |p| phases.push(p)).await;

    assert_eq!(phases, vec![TurnPhase::AwaitingReply, TurnPhase::Idle]);
}

#[tokio::test]
async fn clear_empties_history_and_forces_fresh_token_fetch() {
    let server = MockServer::start().await;

    // One exchange for the first turn, a second one after the clear.
    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(issuer_ok())
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(chat_ok("hi"))
        .mount(&server)
        .await;

    let mut session = session_for(&server);

    session.run_turn("first", |_| {}).await;
    assert_eq!(session.message_count(), 2);

    session.clear().await;
    assert!(session.history().is_empty());

    session.run_turn("second", |_| {}).await;
    assert_eq!(session.message_count(), 2);
}

#[tokio::test]
async fn failed_chat_call_becomes_an_error_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(issuer_ok())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream broke"))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let reply = session.run_turn("hello", |_| {}).await;

    assert!(reply.starts_with("Error:"), "got {:?}", reply);
    let last = session.history().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last.content.starts_with("Error:"));
}

#[tokio::test]
async fn failed_token_fetch_becomes_an_error_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let reply = session.run_turn("hello", |_| {}).await;

    assert!(reply.starts_with("Error:"), "got {:?}", reply);
}

#[tokio::test]
async fn history_stays_in_insertion_order() {
    let server = mock_backend().await;
    let mut session = session_for(&server);

    session.run_turn("one", |_| {}).await;
    session.run_turn("two", |_| {}).await;

    let roles: Vec<Role> = session.history().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(session.history()[0].content, "one");
    assert_eq!(session.history()[2].content, "two");
}
