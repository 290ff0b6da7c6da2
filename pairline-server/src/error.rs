//! Server error types

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pairline_core::{AdapterError, ErrorKind, RenderError, SendError};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while starting or running the pairline server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The session adapter could not be initialized
    #[error("failed to initialize session adapter: {0}")]
    Adapter(#[from] AdapterError),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Body of every failed API response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler failure, rendered as `{ "error": ... }`
#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::NotReady | ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorKind::RenderFailure | ErrorKind::SendFailure | ErrorKind::AdapterFault => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<SendError> for ApiError {
    fn from(e: SendError) -> Self {
        match e.kind() {
            // Adapter detail stays in the logs
            ErrorKind::SendFailure => Self::new(ErrorKind::SendFailure, "Failed to send message"),
            kind => Self::new(kind, e.to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(_: RenderError) -> Self {
        Self::new(ErrorKind::RenderFailure, "Failed to render QR code")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.message,
        };
        (status, Json(body)).into_response()
    }
}
