//! Mock adapter for testing
//!
//! MockAdapter lets tests drive the lifecycle by emitting events directly,
//! script `get_state` and `send_message` outcomes, and inspect what was sent.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::traits::{AdapterEvent, SentMessage, SessionAdapter};
use crate::error::AdapterError;

#[derive(Debug, Default)]
struct MockState {
    connection_state: Option<String>,
    send_failures: VecDeque<String>,
    send_delay: Option<Duration>,
    state_delay: Option<Duration>,
    destroy_delay: Option<Duration>,
    fail_initialize: bool,
    sent: Vec<(String, String)>,
    initialize_calls: usize,
    destroy_calls: usize,
    destroy_completed: usize,
    next_id: u64,
}

/// Scriptable implementation of SessionAdapter
pub struct MockAdapter {
    tx: broadcast::Sender<AdapterEvent>,
    state: Mutex<MockState>,
}

impl MockAdapter {
    /// Create a mock whose `get_state` reports `CONNECTED`
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self {
            tx,
            state: Mutex::new(MockState {
                connection_state: Some("CONNECTED".to_string()),
                ..MockState::default()
            }),
        }
    }

    /// Emit a lifecycle event to subscribers
    pub fn emit(&self, event: AdapterEvent) {
        let _ = self.tx.send(event);
    }

    /// Set what `get_state` reports; `None` makes it fail
    pub fn set_connection_state(&self, state: Option<&str>) {
        self.lock().connection_state = state.map(str::to_owned);
    }

    /// Make the next `send_message` fail with `message`
    pub fn queue_send_failure(&self, message: &str) {
        self.lock().send_failures.push_back(message.to_string());
    }

    /// Delay every `send_message` by `delay`
    pub fn set_send_delay(&self, delay: Duration) {
        self.lock().send_delay = Some(delay);
    }

    /// Delay every `get_state` by `delay`
    pub fn set_state_delay(&self, delay: Duration) {
        self.lock().state_delay = Some(delay);
    }

    /// Delay every `destroy` by `delay`, counted as started but not completed
    pub fn set_destroy_delay(&self, delay: Duration) {
        self.lock().destroy_delay = Some(delay);
    }

    /// Make `initialize` fail
    pub fn fail_initialize(&self) {
        self.lock().fail_initialize = true;
    }

    /// Messages sent so far as `(chat_id, text)`
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.lock().sent.clone()
    }

    pub fn send_count(&self) -> usize {
        self.lock().sent.len()
    }

    pub fn initialize_calls(&self) -> usize {
        self.lock().initialize_calls
    }

    pub fn destroy_calls(&self) -> usize {
        self.lock().destroy_calls
    }

    /// Number of `destroy` calls that have returned
    pub fn destroy_completed(&self) -> usize {
        self.lock().destroy_completed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test thread must not wedge the other assertions
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionAdapter for MockAdapter {
    async fn initialize(&self) -> Result<(), AdapterError> {
        let mut state = self.lock();
        state.initialize_calls += 1;
        if state.fail_initialize {
            return Err(AdapterError::Failed("mock initialize failure".to_string()));
        }
        Ok(())
    }

    async fn destroy(&self) -> Result<(), AdapterError> {
        let delay = {
            let mut state = self.lock();
            state.destroy_calls += 1;
            state.destroy_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.lock().destroy_completed += 1;
        Ok(())
    }

    async fn get_state(&self) -> Result<String, AdapterError> {
        let delay = self.lock().state_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.lock()
            .connection_state
            .clone()
            .ok_or_else(|| AdapterError::Failed("mock state unavailable".to_string()))
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<SentMessage, AdapterError> {
        let delay = self.lock().send_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        state.sent.push((chat_id.to_string(), text.to_string()));
        if let Some(message) = state.send_failures.pop_front() {
            return Err(AdapterError::Failed(message));
        }

        state.next_id += 1;
        Ok(SentMessage {
            id: format!("true_{}_MOCK{:04}", chat_id, state.next_id),
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<AdapterEvent> {
        self.tx.subscribe()
    }
}
