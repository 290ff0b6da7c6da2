//! Shared test utilities for pairline-server integration tests

pub mod client;

use std::net::SocketAddr;
use std::sync::Arc;

use pairline_core::MockAdapter;
use pairline_server::{AppState, PairlineServer, ServerConfig};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Running server bound to a loopback port
#[allow(dead_code)]
pub struct TestServer {
    pub state: Arc<AppState>,
    pub adapter: Arc<MockAdapter>,
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Fire the shutdown signal without waiting for the server to stop
    pub fn signal_shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }

    /// Trigger graceful shutdown and wait for the server task to finish
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), &mut self.handle).await;
    }
}

/// Creates a test server backed by a fresh MockAdapter
#[allow(dead_code)]
pub async fn create_test_server() -> TestServer {
    create_test_server_with_adapter(Arc::new(MockAdapter::new())).await
}

/// Creates a test server around an existing adapter
#[allow(dead_code)]
pub async fn create_test_server_with_adapter(adapter: Arc<MockAdapter>) -> TestServer {
    let state = Arc::new(AppState::new(adapter.clone()));
    let server = PairlineServer::with_state(ServerConfig::default(), Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = server
            .run_with_listener(listener, async move {
                let _ = rx.await;
            })
            .await;
    });

    // Brief delay so the dispatcher and listener are up
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    TestServer {
        state,
        adapter,
        addr,
        shutdown: Some(tx),
        handle,
    }
}

/// Wait until the session store reaches `predicate`, or panic after 2s
#[allow(dead_code)]
pub async fn wait_for<F>(state: &AppState, predicate: F)
where
    F: Fn(&pairline_core::SessionSnapshot) -> bool,
{
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
    loop {
        if predicate(&state.store.snapshot().await) {
            return;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("session never reached the expected state");
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}
