//! REST API handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use pairline_core::outbound::{self, OutboundMessageRequest};
use pairline_core::{ErrorKind, SessionSnapshot, pairing};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::AppState;
use crate::error::ApiError;

/// Message returned by the QR endpoint when no code is pending
pub const NO_QR_MESSAGE: &str = "No QR code available";

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
    /// Number of connected real-time subscribers
    pub subscribers: usize,
}

/// Pairing image response
#[derive(Debug, Serialize, Deserialize)]
pub struct QrResponse {
    /// PNG data URL, or null when no code is pending
    pub qr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Successful send response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub success: bool,
    pub message_id: String,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        subscribers: state.store.hub().subscriber_count().await,
    })
}

/// Current session snapshot
pub async fn status(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.store.snapshot().await)
}

/// Pending pairing code rendered as a PNG data URL
pub async fn qr(State(state): State<Arc<AppState>>) -> Result<Json<QrResponse>, ApiError> {
    let Some(code) = state.store.pairing_code().await else {
        return Ok(Json(QrResponse {
            qr: None,
            message: Some(NO_QR_MESSAGE.to_string()),
        }));
    };

    let url = pairing::render_data_url(&code).map_err(|e| {
        error!(kind = %ErrorKind::RenderFailure, "Failed to render QR code: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(QrResponse {
        qr: Some(url),
        message: None,
    }))
}

/// Send a text message through the adapter
///
/// A body that is not a JSON object is treated like one with no fields, so
/// the readiness check still comes first.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OutboundMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Unusable send-message body: {}", rejection);
            OutboundMessageRequest::default()
        }
    };

    let sent = outbound::send_message(
        &state.store,
        state.adapter.as_ref(),
        request,
        state.send_timeout,
    )
    .await?;

    Ok(Json(SendMessageResponse {
        success: true,
        message_id: sent.id,
    }))
}
