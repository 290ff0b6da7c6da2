//! Session state store
//!
//! `SessionStore` owns the lifecycle machine and the broadcast hub. All
//! mutation goes through [`SessionStore::apply`]; the dispatcher is its only
//! caller. The machine lock is held across fan-out so that late joiners
//! registered through [`SessionStore::subscribe`] see a snapshot that is
//! exactly one step behind the next event they receive.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::error::{ErrorKind, SessionError};
use crate::events::{BroadcastHub, HubEvent, Subscription};
use crate::pairing;

use super::state::{Broadcast, LifecycleEvent, SessionMachine, SessionSnapshot, SessionState};

/// Process-wide holder of the session lifecycle
pub struct SessionStore {
    machine: RwLock<SessionMachine>,
    hub: Arc<BroadcastHub>,
}

impl SessionStore {
    /// Create a store with a fresh machine and its own hub
    pub fn new() -> Self {
        Self {
            machine: RwLock::new(SessionMachine::new()),
            hub: Arc::new(BroadcastHub::new()),
        }
    }

    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.machine.read().await.snapshot()
    }

    pub async fn state(&self) -> SessionState {
        self.machine.read().await.state()
    }

    pub async fn is_ready(&self) -> bool {
        self.machine.read().await.is_ready()
    }

    /// Current pairing code, if one is waiting to be scanned
    pub async fn pairing_code(&self) -> Option<String> {
        self.machine.read().await.pairing_code().map(str::to_owned)
    }

    /// Apply a lifecycle event and publish its broadcast
    ///
    /// Returns the state after the transition. A malformed event is logged
    /// and rejected; the machine is left as it was.
    pub async fn apply(&self, event: LifecycleEvent) -> Result<SessionState, SessionError> {
        let mut machine = self.machine.write().await;
        let from = machine.state();

        let broadcast = match machine.apply(event) {
            Ok(broadcast) => broadcast,
            Err(e) => {
                warn!(
                    kind = %e.kind(),
                    state = from.as_str(),
                    "Ignoring adapter event: {}", e
                );
                return Err(e);
            }
        };

        let to = machine.state();
        if from != to {
            info!(from = from.as_str(), to = to.as_str(), "Session state changed");
        }

        if let Some(event) = hub_event(broadcast) {
            self.hub.broadcast(event).await;
        }

        Ok(to)
    }

    /// Register a subscriber and queue its late-join events
    ///
    /// The subscriber first receives `status` with the current snapshot and,
    /// while a pairing code is pending, a freshly rendered `qr`.
    pub async fn subscribe(&self) -> Subscription {
        let machine = self.machine.read().await;

        let mut initial = vec![HubEvent::Status(machine.snapshot())];
        if let Some(code) = machine.pairing_code() {
            match pairing::render_data_url(code) {
                Ok(url) => initial.push(HubEvent::Qr(url)),
                Err(e) => error!(
                    kind = %ErrorKind::RenderFailure,
                    "Failed to render QR code for new subscriber: {}", e
                ),
            }
        }

        self.hub.subscribe_with(initial).await
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a transition broadcast onto the wire event, rendering pairing codes
fn hub_event(broadcast: Broadcast) -> Option<HubEvent> {
    match broadcast {
        Broadcast::Qr(code) => match pairing::render_data_url(&code) {
            Ok(url) => Some(HubEvent::Qr(url)),
            Err(e) => {
                error!(kind = %ErrorKind::RenderFailure, "Failed to render QR code: {}", e);
                None
            }
        },
        Broadcast::Authenticated => Some(HubEvent::Authenticated),
        Broadcast::Ready(identity) => Some(HubEvent::Ready(identity)),
        Broadcast::AuthFailure(reason) => Some(HubEvent::AuthFailure(reason)),
        Broadcast::Disconnected(reason) => Some(HubEvent::Disconnected(reason)),
    }
}
