//! Credential fetch against a mock relay.

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use pitchcoach_realtime::{CredentialClient, RealtimeError};
use serde_json::{Value, json};

async fn spawn_mock_relay(status: StatusCode, body: Value) -> String {
    let app = Router::new()
        .route("/api/token", get(move || async move { (status, Json(body.clone())) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn fetches_credential_from_relay() {
    let base = spawn_mock_relay(
        StatusCode::OK,
        json!({ "ephemeralKey": "ek_abc", "model": "gpt-4o-realtime-preview-2024-12-17" }),
    )
    .await;

    let credential = CredentialClient::new(&base).unwrap().fetch().await.unwrap();
    assert_eq!(credential.ephemeral_key, "ek_abc");
    assert_eq!(credential.model, "gpt-4o-realtime-preview-2024-12-17");
}

#[tokio::test]
async fn relay_error_body_is_surfaced() {
    let base = spawn_mock_relay(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "OPENAI_API_KEY is not set on the server" }),
    )
    .await;

    let err = CredentialClient::new(&base).unwrap().fetch().await.unwrap_err();
    match err {
        RealtimeError::CredentialFetch(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("OPENAI_API_KEY is not set"));
        }
        other => panic!("expected CredentialFetch, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_token_payload_is_a_credential_error() {
    let base = spawn_mock_relay(StatusCode::OK, json!({ "unexpected": true })).await;

    let err = CredentialClient::new(&base).unwrap().fetch().await.unwrap_err();
    assert!(matches!(err, RealtimeError::CredentialFetch(_)));
}

#[tokio::test]
async fn unreachable_relay_is_a_credential_error() {
    let client = CredentialClient::new("http://127.0.0.1:1").unwrap();
    let err = client.fetch().await.unwrap_err();
    assert!(matches!(err, RealtimeError::CredentialFetch(_)));
}

#[test]
fn invalid_relay_url_is_rejected() {
    assert!(CredentialClient::new("not a url").is_err());
}
