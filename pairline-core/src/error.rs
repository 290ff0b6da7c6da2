//! Error types for pairline-core

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Error taxonomy shared by the request surface and the event path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A precondition on session state was not met
    NotReady,
    /// Malformed caller input
    InvalidRequest,
    /// QR image generation failed
    RenderFailure,
    /// The adapter rejected or failed an outbound send
    SendFailure,
    /// The adapter emitted something the session cannot use
    AdapterFault,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotReady => "not_ready",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::RenderFailure => "render_failure",
            ErrorKind::SendFailure => "send_failure",
            ErrorKind::AdapterFault => "adapter_fault",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from session adapters
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Bridge request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to connect to bridge event stream: {0}")]
    Connect(String),

    #[error("Bridge rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid bridge configuration: {0}")]
    Config(String),

    #[error("Unexpected bridge response: {0}")]
    Protocol(String),

    #[error("Adapter failure: {0}")]
    Failed(String),
}

/// Errors while rendering a pairing code as an image
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to encode QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("Failed to write QR image: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors raised by the session lifecycle machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Malformed pairing code from adapter")]
    MalformedPairingCode,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::AdapterFault
    }
}

/// Errors from the outbound send path
#[derive(Error, Debug)]
pub enum SendError {
    #[error("Session is not ready")]
    NotReady,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Send timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to send message: {0}")]
    Failed(#[from] AdapterError),
}

impl SendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SendError::NotReady => ErrorKind::NotReady,
            SendError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            SendError::Timeout(_) | SendError::Failed(_) => ErrorKind::SendFailure,
        }
    }
}
