//! Shared application state for the pairline server

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pairline_core::{DEFAULT_IDENTITY_TIMEOUT, SessionAdapter, SessionStore};

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle and its broadcast hub
    pub store: Arc<SessionStore>,
    /// Adapter driving the automated session
    pub adapter: Arc<dyn SessionAdapter>,
    /// Upper bound on a single outbound send, if any
    pub send_timeout: Option<Duration>,
    /// How long `ready` waits for the adapter to report identity
    pub identity_timeout: Duration,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state around an adapter with a fresh session store
    pub fn new(adapter: Arc<dyn SessionAdapter>) -> Self {
        Self::with_components(Arc::new(SessionStore::new()), adapter)
    }

    /// Create AppState with custom components (for testing)
    pub fn with_components(store: Arc<SessionStore>, adapter: Arc<dyn SessionAdapter>) -> Self {
        Self {
            store,
            adapter,
            send_timeout: None,
            identity_timeout: DEFAULT_IDENTITY_TIMEOUT,
            started_at: Utc::now(),
        }
    }

    /// Bound outbound sends by `timeout`
    pub fn with_send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn with_identity_timeout(mut self, timeout: Duration) -> Self {
        self.identity_timeout = timeout;
        self
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairline_core::MockAdapter;

    #[test]
    fn test_app_state_new() {
        let state = AppState::new(Arc::new(MockAdapter::new()));
        assert!(state.uptime_seconds() >= 0);
        assert!(state.send_timeout.is_none());
    }

    #[test]
    fn test_app_state_with_send_timeout() {
        let state = AppState::new(Arc::new(MockAdapter::new()))
            .with_send_timeout(Some(Duration::from_secs(30)));
        assert_eq!(state.send_timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_app_state_shares_store() {
        let store = Arc::new(SessionStore::new());
        let state = AppState::with_components(store.clone(), Arc::new(MockAdapter::new()));
        assert!(Arc::ptr_eq(&state.store, &store));
        assert!(!state.store.is_ready().await);
    }
}
