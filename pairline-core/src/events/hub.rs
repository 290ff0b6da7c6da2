//! Subscriber registry and fan-out
//!
//! Each subscriber owns an unbounded channel, so a slow connection never
//! holds up delivery to the others. The handle list is copied before every
//! fan-out; subscribers whose receiver is gone are pruned afterwards.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, mpsc};
use tracing::{debug, trace};

use super::HubEvent;

/// Identifier assigned to each subscriber, increasing in connection order
pub type SubscriberId = u64;

/// Receiving side of a hub registration
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::UnboundedReceiver<HubEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event; `None` once the hub dropped this subscriber
    pub async fn recv(&mut self) -> Option<HubEvent> {
        self.rx.recv().await
    }

    /// Take an already queued event without waiting
    pub fn try_recv(&mut self) -> Option<HubEvent> {
        self.rx.try_recv().ok()
    }
}

/// Fan-out of hub events to every registered subscriber
pub struct BroadcastHub {
    subscribers: RwLock<BTreeMap<SubscriberId, mpsc::UnboundedSender<HubEvent>>>,
    next_id: AtomicU64,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a subscriber with nothing queued
    pub async fn subscribe(&self) -> Subscription {
        self.subscribe_with(Vec::new()).await
    }

    /// Register a subscriber whose channel already holds `initial`
    ///
    /// The initial events are queued before registration, so they always
    /// precede anything broadcast afterwards.
    pub async fn subscribe_with(&self, initial: Vec<HubEvent>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        for event in initial {
            // Receiver is alive in this scope
            let _ = tx.send(event);
        }

        self.subscribers.write().await.insert(id, tx);
        debug!(subscriber = id, "Subscriber registered");

        Subscription { id, rx }
    }

    /// Remove a subscriber; returns whether it was registered
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.write().await.remove(&id).is_some();
        if removed {
            debug!(subscriber = id, "Subscriber removed");
        }
        removed
    }

    /// Deliver an event to every subscriber, returning how many received it
    pub async fn broadcast(&self, event: HubEvent) -> usize {
        let handles: Vec<(SubscriberId, mpsc::UnboundedSender<HubEvent>)> = self
            .subscribers
            .read()
            .await
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, tx) in handles {
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                closed.push(id);
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in &closed {
                subscribers.remove(id);
            }
            debug!(pruned = closed.len(), "Pruned closed subscribers");
        }

        trace!(event = event.name(), delivered, "Broadcast hub event");
        delivered
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
