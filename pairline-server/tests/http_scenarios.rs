//! End-to-end HTTP scenarios
//!
//! Adapter events are emitted on a MockAdapter and flow through the
//! dispatcher into the store before the HTTP surface is queried.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pairline_core::{AdapterEvent, MockAdapter};
use pairline_core::pairing::DATA_URL_PREFIX;
use serde_json::{Value, json};

#[tokio::test]
async fn pairing_then_ready_updates_status_and_qr() {
    let server = common::create_test_server().await;
    let http = reqwest::Client::new();

    server.adapter.emit(AdapterEvent::Qr("ABC".into()));
    common::wait_for(&server.state, |s| s.has_qr).await;

    let qr: Value = http
        .get(server.http_url("/api/qr"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(qr["qr"].as_str().unwrap().starts_with(DATA_URL_PREFIX));

    server.adapter.emit(AdapterEvent::Ready);
    common::wait_for(&server.state, |s| s.is_ready).await;

    let status: Value = http
        .get(server.http_url("/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["isReady"], true);
    assert_eq!(status["hasQR"], false);
    assert_eq!(status["clientInfo"]["state"], "CONNECTED");

    let qr: Value = http
        .get(server.http_url("/api/qr"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(qr["qr"].is_null());

    server.shutdown().await;
}

#[tokio::test]
async fn ready_session_sends_normalized_message() {
    let server = common::create_test_server().await;
    server.adapter.emit(AdapterEvent::Ready);
    common::wait_for(&server.state, |s| s.is_ready).await;

    let response = reqwest::Client::new()
        .post(server.http_url("/api/send-message"))
        .json(&json!({ "number": "5551234567", "message": "hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(
        server.adapter.sent_messages(),
        vec![("5551234567@c.us".to_string(), "hi".to_string())]
    );
    assert!(body["messageId"].as_str().unwrap().contains("5551234567@c.us"));

    server.shutdown().await;
}

#[tokio::test]
async fn empty_body_is_rejected_without_touching_adapter() {
    let server = common::create_test_server().await;
    server.adapter.emit(AdapterEvent::Ready);
    common::wait_for(&server.state, |s| s.is_ready).await;

    let response = reqwest::Client::new()
        .post(server.http_url("/api/send-message"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert_eq!(server.adapter.send_count(), 0);

    server.shutdown().await;
}

#[tokio::test]
async fn send_before_ready_is_rejected() {
    let server = common::create_test_server().await;

    let response = reqwest::Client::new()
        .post(server.http_url("/api/send-message"))
        .json(&json!({ "number": "5551234567", "message": "hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(server.adapter.send_count(), 0);

    server.shutdown().await;
}

#[tokio::test]
async fn disconnect_makes_session_not_ready() {
    let server = common::create_test_server().await;
    server.adapter.emit(AdapterEvent::Ready);
    common::wait_for(&server.state, |s| s.is_ready).await;

    server
        .adapter
        .emit(AdapterEvent::Disconnected("NAVIGATION".into()));
    common::wait_for(&server.state, |s| !s.is_ready).await;

    let status: Value = reqwest::get(server.http_url("/api/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["isReady"], false);
    assert!(status["clientInfo"].is_null());

    server.shutdown().await;
}

#[tokio::test]
async fn startup_initializes_and_shutdown_destroys_adapter() {
    let server = common::create_test_server().await;
    let adapter = server.adapter.clone();

    assert_eq!(adapter.initialize_calls(), 1);
    assert_eq!(adapter.destroy_calls(), 0);

    server.shutdown().await;

    assert_eq!(adapter.destroy_calls(), 1);
}

#[tokio::test]
async fn listener_serves_until_adapter_destroy_completes() {
    let adapter = Arc::new(MockAdapter::new());
    adapter.set_destroy_delay(Duration::from_millis(500));
    let mut server = common::create_test_server_with_adapter(adapter.clone()).await;

    server.signal_shutdown();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while adapter.destroy_calls() == 0 {
        assert!(tokio::time::Instant::now() < deadline, "destroy never started");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(adapter.destroy_completed(), 0);

    let status: Value = reqwest::get(server.http_url("/api/status"))
        .await
        .expect("listener closed before destroy finished")
        .json()
        .await
        .unwrap();
    assert_eq!(status["isReady"], json!(false));

    server.shutdown().await;
    assert_eq!(adapter.destroy_completed(), 1);
}
