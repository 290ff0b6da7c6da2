//! HTTP server module

mod api;
mod static_files;

use std::sync::Arc;

use axum::http::Method;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;
use crate::ws::ws_handler;

pub use api::{HealthResponse, NO_QR_MESSAGE, QrResponse, SendMessageResponse};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/status", get(api::status))
        .route("/api/status", get(api::status))
        .route("/api/health", get(api::health))
        .route("/api/qr", get(api::qr))
        .route("/api/send-message", post(api::send_message))
        .route("/ws", get(ws_handler))
        .fallback(static_files::static_handler)
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};
    use axum_test::TestServer;
    use pairline_core::MockAdapter;

    fn create_test_server() -> TestServer {
        let state = Arc::new(AppState::new(Arc::new(MockAdapter::new())));
        TestServer::new(create_router(state)).unwrap()
    }

    #[tokio::test]
    async fn test_router_has_health_endpoint() {
        let server = create_test_server();

        server.get("/api/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_status_served_on_both_paths() {
        let server = create_test_server();

        let legacy: serde_json::Value = server.get("/status").await.json();
        let api: serde_json::Value = server.get("/api/status").await.json();

        assert_eq!(legacy["isReady"], api["isReady"]);
        assert_eq!(legacy["hasQR"], api["hasQR"]);
    }

    #[tokio::test]
    async fn test_root_serves_landing_page() {
        let server = create_test_server();

        let response = server.get("/").await;

        response.assert_status_ok();
        assert!(response.text().contains("<html"));
    }

    #[tokio::test]
    async fn test_unknown_path_falls_back_to_landing_page() {
        let server = create_test_server();

        let response = server.get("/some/client/route").await;

        response.assert_status_ok();
        assert!(response.text().contains("<html"));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let server = create_test_server();

        let response = server
            .get("/api/status")
            .add_header(
                HeaderName::from_static("origin"),
                HeaderValue::from_static("http://example.com"),
            )
            .await;

        assert_eq!(response.header("access-control-allow-origin"), "*");
    }
}
