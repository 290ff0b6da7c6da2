//! Session lifecycle state machine
//!
//! `SessionMachine` is a pure fold over [`LifecycleEvent`]s. It owns the
//! lifecycle state, the pending pairing code and the identity captured when
//! the session became ready, and reports what each transition should
//! broadcast. Rendering and fan-out happen in [`SessionStore`](super::SessionStore).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Lifecycle state of the linked messaging session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No pairing has started yet, or the last authentication failed
    #[default]
    Uninitialized,
    /// A pairing code is waiting to be scanned
    AwaitingPairing,
    /// Credentials accepted but the session is not usable yet
    Authenticated,
    /// Session is usable for sending
    Ready,
    /// Session was lost; the adapter may restart pairing
    Disconnected,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::AwaitingPairing => "awaiting_pairing",
            SessionState::Authenticated => "authenticated",
            SessionState::Ready => "ready",
            SessionState::Disconnected => "disconnected",
        }
    }
}

/// Identity snapshot captured when the session becomes ready
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityInfo {
    /// Raw state string reported by the adapter
    pub state: String,
    /// When the state was observed
    pub timestamp: DateTime<Utc>,
}

impl IdentityInfo {
    /// Identity observed at the current instant
    pub fn observed_now(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Read-only view of the session, derived on every read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub is_ready: bool,
    #[serde(rename = "hasQR")]
    pub has_qr: bool,
    pub client_info: Option<IdentityInfo>,
    pub timestamp: DateTime<Utc>,
}

/// Input to the lifecycle machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The adapter produced a new pairing code
    PairingCode(String),
    /// The adapter accepted credentials
    Authenticated,
    /// The session is usable; identity is absent when the fetch failed
    Ready(Option<IdentityInfo>),
    /// Authentication was rejected
    AuthFailed(String),
    /// The session was lost
    Disconnected(String),
}

/// What a transition asks the hub to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Broadcast {
    /// Pairing code to render and publish as `qr`
    Qr(String),
    Authenticated,
    Ready(Option<IdentityInfo>),
    AuthFailure(String),
    Disconnected(String),
}

/// The session lifecycle machine
///
/// Holds `pairing_code` only in `AwaitingPairing` and `identity` only in
/// `Ready`; every transition re-establishes both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMachine {
    state: SessionState,
    pairing_code: Option<String>,
    identity: Option<IdentityInfo>,
}

impl SessionMachine {
    /// Create a machine in `Uninitialized`
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a sequence of events over a fresh machine, skipping faulty ones
    pub fn replay(events: impl IntoIterator<Item = LifecycleEvent>) -> Self {
        let mut machine = Self::new();
        for event in events {
            let _ = machine.apply(event);
        }
        machine
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pairing_code(&self) -> Option<&str> {
        self.pairing_code.as_deref()
    }

    pub fn identity(&self) -> Option<&IdentityInfo> {
        self.identity.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Project the current state into a snapshot stamped with the current time
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            is_ready: self.is_ready(),
            has_qr: self.pairing_code.is_some(),
            client_info: self.identity.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Apply one event and return the broadcast it produces
    ///
    /// A malformed pairing code leaves the machine untouched.
    pub fn apply(&mut self, event: LifecycleEvent) -> Result<Broadcast, SessionError> {
        match event {
            LifecycleEvent::PairingCode(code) => {
                if code.trim().is_empty() {
                    return Err(SessionError::MalformedPairingCode);
                }
                self.state = SessionState::AwaitingPairing;
                self.identity = None;
                self.pairing_code = Some(code.clone());
                Ok(Broadcast::Qr(code))
            }
            LifecycleEvent::Authenticated => Ok(Broadcast::Authenticated),
            LifecycleEvent::Ready(identity) => {
                self.state = SessionState::Ready;
                self.pairing_code = None;
                self.identity = identity.clone();
                Ok(Broadcast::Ready(identity))
            }
            LifecycleEvent::AuthFailed(reason) => {
                self.state = SessionState::Uninitialized;
                self.pairing_code = None;
                self.identity = None;
                Ok(Broadcast::AuthFailure(reason))
            }
            LifecycleEvent::Disconnected(reason) => {
                self.state = SessionState::Disconnected;
                self.pairing_code = None;
                self.identity = None;
                Ok(Broadcast::Disconnected(reason))
            }
        }
    }
}
