//! REST client tests against a mock agent service.

use std::sync::Arc;

use mockito::{Matcher, Server};
use ra_agents::{AgentConnector, AgentService, MessageContent, RestConnector, RunStatus};
use ra_domain::config::AgentServiceConfig;
use ra_domain::error::Error;
use serde_json::json;

fn connect(server: &Server) -> Arc<dyn AgentService> {
    let cfg = AgentServiceConfig {
        endpoint: Some(server.url()),
        api_key: Some("test-token".into()),
        ..AgentServiceConfig::default()
    };
    RestConnector::new(&cfg).unwrap().connect(&cfg).unwrap()
}

fn api_version() -> Matcher {
    Matcher::UrlEncoded("api-version".into(), "v1".into())
}

#[tokio::test]
async fn create_thread_sends_auth_and_api_version() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/threads")
        .match_query(api_version())
        .match_header("authorization", "Bearer test-token")
        .match_header("x-ms-client-request-id", Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"thread_abc","object":"thread"}"#)
        .create_async()
        .await;

    let thread = connect(&server).create_thread().await.unwrap();

    mock.assert_async().await;
    assert_eq!(thread.id, "thread_abc");
}

#[tokio::test]
async fn create_message_and_run_send_expected_bodies() {
    let mut server = Server::new_async().await;
    let message_mock = server
        .mock("POST", "/threads/thread_abc/messages")
        .match_query(api_version())
        .match_body(Matcher::Json(json!({ "role": "user", "content": "Hi" })))
        .with_status(200)
        .with_body(r#"{"id":"msg_1","role":"user","content":[{"type":"text","text":{"value":"Hi","annotations":[]}}]}"#)
        .create_async()
        .await;
    let run_mock = server
        .mock("POST", "/threads/thread_abc/runs")
        .match_query(api_version())
        .match_body(Matcher::Json(json!({ "assistant_id": "asst_1" })))
        .with_status(200)
        .with_body(r#"{"id":"run_1","thread_id":"thread_abc","status":"queued","last_error":null}"#)
        .create_async()
        .await;

    let service = connect(&server);
    let msg = service.create_message("thread_abc", "Hi").await.unwrap();
    let run = service.create_run("thread_abc", "asst_1").await.unwrap();

    message_mock.assert_async().await;
    run_mock.assert_async().await;
    assert_eq!(msg.role, "user");
    assert_eq!(run.id, "run_1");
    assert_eq!(run.status, RunStatus::Queued);
}

#[tokio::test]
async fn list_messages_follows_cursor_pagination_in_order() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/threads/thread_abc/messages")
        .match_query(Matcher::Regex("^order=asc&limit=100&api-version=v1$".into()))
        .with_status(200)
        .with_body(
            json!({
                "data": [
                    { "id": "msg_1", "role": "user", "content": [{ "type": "text", "text": { "value": "Hi" } }] },
                    { "id": "msg_2", "role": "assistant", "content": [] },
                ],
                "has_more": true,
                "last_id": "msg_2",
            })
            .to_string(),
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", "/threads/thread_abc/messages")
        .match_query(Matcher::Regex("after=msg_2".into()))
        .with_status(200)
        .with_body(
            json!({
                "data": [
                    { "id": "msg_3", "role": "assistant", "content": [{ "type": "text", "text": { "value": "Hello!" } }] },
                ],
                "has_more": false,
                "last_id": "msg_3",
            })
            .to_string(),
        )
        .create_async()
        .await;

    let messages = connect(&server).list_messages("thread_abc").await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["msg_1", "msg_2", "msg_3"]);
    assert!(matches!(messages[2].content[0], MessageContent::Text { .. }));
}

#[tokio::test]
async fn server_error_is_reported_once_without_retry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/threads/thread_abc/runs/run_1")
        .match_query(api_version())
        .with_status(503)
        .with_body("upstream unavailable")
        .expect(1)
        .create_async()
        .await;

    let err = connect(&server)
        .get_run("thread_abc", "run_1")
        .await
        .unwrap_err();

    mock.assert_async().await;
    match err {
        Error::AgentService { status, message, .. } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("expected AgentService error, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/threads")
        .match_query(api_version())
        .with_status(401)
        .with_body(r#"{"error":"invalid token"}"#)
        .create_async()
        .await;

    let err = connect(&server).create_thread().await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_body_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/threads/thread_abc/runs/run_1/cancel")
        .match_query(api_version())
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = connect(&server)
        .cancel_run("thread_abc", "run_1")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to parse"), "got {err}");
}
