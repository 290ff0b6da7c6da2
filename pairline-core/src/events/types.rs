//! Events pushed to real-time subscribers
//!
//! Serialized as `{ "event": <name>, "data": <payload> }`; payload-less
//! events omit `data`.

use serde::{Deserialize, Serialize};

use crate::session::{IdentityInfo, SessionSnapshot};

/// An event delivered to every connected subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum HubEvent {
    /// Pairing code rendered as a PNG data URL
    Qr(String),
    /// Session became usable; identity is null when it could not be fetched
    Ready(Option<IdentityInfo>),
    /// Credentials accepted
    Authenticated,
    /// Authentication rejected, with the adapter's reason
    AuthFailure(String),
    /// Session lost, with the adapter's reason
    Disconnected(String),
    /// Current snapshot, sent once when a subscriber connects
    Status(SessionSnapshot),
}

impl HubEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            HubEvent::Qr(_) => "qr",
            HubEvent::Ready(_) => "ready",
            HubEvent::Authenticated => "authenticated",
            HubEvent::AuthFailure(_) => "auth_failure",
            HubEvent::Disconnected(_) => "disconnected",
            HubEvent::Status(_) => "status",
        }
    }
}
