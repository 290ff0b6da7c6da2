//! pairline-server - HTTP and WebSocket surface for pairline
//!
//! This crate owns the process-wide [`AppState`]: the session store fed by the
//! adapter dispatcher, and the adapter used for outbound sends. Browsers poll
//! the REST endpoints or subscribe over the `/ws` channel.

mod error;
pub mod http;
mod state;
pub mod ws;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use pairline_core::{DEFAULT_IDENTITY_TIMEOUT, SessionAdapter, SessionDispatcher};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub use error::{ApiError, ErrorBody, ServerError};
pub use http::create_router;
pub use state::AppState;

/// The main pairline server
pub struct PairlineServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl PairlineServer {
    /// Create a server driving `adapter` with a fresh session store
    pub fn new(config: ServerConfig, adapter: Arc<dyn SessionAdapter>) -> Self {
        let state = AppState::new(adapter)
            .with_send_timeout(config.send_timeout)
            .with_identity_timeout(config.identity_timeout);
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Create a server with custom state (for testing)
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Initialize the session, bind the configured address and serve until
    /// SIGINT or SIGTERM
    pub async fn run(self) -> Result<(), ServerError> {
        let dispatcher = self.start().await?;

        let addr = self.config.addr();
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                dispatcher.abort();
                return Err(ServerError::Bind { addr, source: e });
            }
        };

        self.serve(listener, dispatcher, shutdown_signal()).await
    }

    /// Initialize the session and serve on an already bound listener until
    /// `shutdown` resolves
    pub async fn run_with_listener<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let dispatcher = self.start().await?;
        self.serve(listener, dispatcher, shutdown).await
    }

    /// Start consuming adapter events, then ask the adapter to initialize
    ///
    /// The dispatcher subscribes first so no event emitted during
    /// initialization is lost.
    async fn start(&self) -> Result<JoinHandle<()>, ServerError> {
        let dispatcher = SessionDispatcher::new(
            Arc::clone(&self.state.adapter),
            Arc::clone(&self.state.store),
        )
        .with_identity_timeout(self.state.identity_timeout)
        .spawn();

        if let Err(e) = self.state.adapter.initialize().await {
            error!("Session adapter failed to initialize: {}", e);
            dispatcher.abort();
            return Err(ServerError::Adapter(e));
        }

        info!("Session adapter initialized");
        Ok(dispatcher)
    }

    async fn serve<F>(
        self,
        listener: TcpListener,
        dispatcher: JoinHandle<()>,
        shutdown: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| self.config.addr());
        info!("pairline server listening on {}", local);

        let adapter = Arc::clone(&self.state.adapter);
        let router = create_router(self.state);

        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Shutting down");
                if let Err(e) = adapter.destroy().await {
                    warn!("Failed to destroy session adapter: {}", e);
                }
            })
            .await;

        dispatcher.abort();
        result.map_err(|e| ServerError::Internal(e.to_string()))?;

        info!("pairline server stopped");
        Ok(())
    }
}

/// Resolve on SIGINT, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Upper bound on a single outbound send
    pub send_timeout: Option<Duration>,
    /// How long `ready` waits for the adapter to report identity
    pub identity_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            send_timeout: None,
            identity_timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            send_timeout: None,
            identity_timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }

    /// Returns the socket address string (e.g., "0.0.0.0:3000")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
