//! SessionAdapter trait and related types
//!
//! The adapter is the seam to the external automation engine that hosts the
//! messaging session. Everything behind it (browser, transport, persisted
//! credentials) is out of pairline's hands.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::AdapterError;

/// Lifecycle event emitted by an adapter
///
/// Also the bridge wire format: `{ "event": "qr", "data": "<code>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum AdapterEvent {
    /// A new pairing code is available
    Qr(String),
    /// Credentials were accepted
    Authenticated,
    /// The session is usable
    Ready,
    /// Authentication was rejected
    AuthFailure(String),
    /// The session was lost
    Disconnected(String),
}

/// Identifier assigned by the adapter to an outbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub id: String,
}

/// Trait for messaging session adapters
#[async_trait]
pub trait SessionAdapter: Send + Sync {
    /// Start the session; pairing or restore begins after this returns
    async fn initialize(&self) -> Result<(), AdapterError>;

    /// Tear the session down
    async fn destroy(&self) -> Result<(), AdapterError>;

    /// Raw connection state as reported by the engine (e.g. `CONNECTED`)
    async fn get_state(&self) -> Result<String, AdapterError>;

    /// Send a text message to an already normalized chat id
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<SentMessage, AdapterError>;

    /// Subscribe to lifecycle events
    ///
    /// Subscribe before calling [`initialize`](Self::initialize); events
    /// emitted earlier are not replayed.
    fn subscribe(&self) -> broadcast::Receiver<AdapterEvent>;
}
