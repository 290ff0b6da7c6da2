//! Adapter event dispatcher
//!
//! The dispatcher is the single consumer of adapter events and the only
//! writer to the [`SessionStore`]. Events are handled one at a time in the
//! order the adapter emitted them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::adapter::{AdapterEvent, SessionAdapter};
use crate::error::ErrorKind;

use super::state::{IdentityInfo, LifecycleEvent};
use super::store::SessionStore;

/// How long a `ready` waits for the adapter to report its identity
pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

/// Feeds adapter events through the session lifecycle
pub struct SessionDispatcher {
    adapter: Arc<dyn SessionAdapter>,
    store: Arc<SessionStore>,
    identity_timeout: Duration,
}

impl SessionDispatcher {
    pub fn new(adapter: Arc<dyn SessionAdapter>, store: Arc<SessionStore>) -> Self {
        Self {
            adapter,
            store,
            identity_timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }

    /// Bound the identity lookup made on `ready`
    ///
    /// When it elapses the session still becomes ready, without identity.
    pub fn with_identity_timeout(mut self, timeout: Duration) -> Self {
        self.identity_timeout = timeout;
        self
    }

    /// Subscribe to the adapter and process its events in a background task
    ///
    /// The subscription is taken before this returns, so it is safe to call
    /// `initialize` on the adapter right after.
    pub fn spawn(self) -> JoinHandle<()> {
        let rx = self.adapter.subscribe();
        tokio::spawn(async move { self.run(rx).await })
    }

    async fn run(self, mut rx: broadcast::Receiver<AdapterEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => self.handle(event).await,
                Err(RecvError::Closed) => {
                    info!("Adapter event stream closed");
                    break;
                }
                Err(RecvError::Lagged(count)) => {
                    // Skipped events are gone; the session may now disagree with the adapter
                    error!(
                        kind = %ErrorKind::AdapterFault,
                        "Session dispatcher lagged, {} adapter events were dropped", count
                    );
                }
            }
        }
    }

    /// Translate one adapter event and apply it to the store
    pub async fn handle(&self, event: AdapterEvent) {
        let lifecycle = match event {
            AdapterEvent::Qr(code) => {
                info!("Pairing code received");
                LifecycleEvent::PairingCode(code)
            }
            AdapterEvent::Authenticated => {
                info!("Session authenticated");
                LifecycleEvent::Authenticated
            }
            AdapterEvent::Ready => {
                info!("Session ready");
                LifecycleEvent::Ready(self.fetch_identity().await)
            }
            AdapterEvent::AuthFailure(reason) => {
                warn!(%reason, "Authentication failed");
                LifecycleEvent::AuthFailed(reason)
            }
            AdapterEvent::Disconnected(reason) => {
                info!(%reason, "Session disconnected");
                LifecycleEvent::Disconnected(reason)
            }
        };

        // Faults are logged by the store and leave the state untouched
        let _ = self.store.apply(lifecycle).await;
    }

    async fn fetch_identity(&self) -> Option<IdentityInfo> {
        match tokio::time::timeout(self.identity_timeout, self.adapter.get_state()).await {
            Ok(Ok(state)) => Some(IdentityInfo::observed_now(state)),
            Ok(Err(e)) => {
                warn!("Failed to fetch session identity: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    "Session identity not reported within {:?}",
                    self.identity_timeout
                );
                None
            }
        }
    }
}
