//! pairline-core: Core library for the pairline messaging gateway
//!
//! This crate provides the pieces that sit between an automated messaging
//! session and the clients watching it:
//!
//! - **Session lifecycle** - [`SessionMachine`] folds adapter events into a
//!   [`SessionState`], and [`SessionStore`] publishes each transition
//! - **Broadcast hub** - [`BroadcastHub`] fans [`HubEvent`]s out to every
//!   connected subscriber
//! - **Adapters** - the [`SessionAdapter`] trait, with [`BridgeAdapter`] for a
//!   live automation bridge and [`MockAdapter`] for tests
//! - **Pairing** - [`pairing::render_data_url`] turns pairing codes into PNG
//!   data URLs
//! - **Outbound** - [`outbound::send_message`] validates and delivers text
//!   messages
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use pairline_core::{BridgeAdapter, BridgeConfig, SessionAdapter, SessionDispatcher, SessionStore};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter: Arc<dyn SessionAdapter> = Arc::new(BridgeAdapter::new(BridgeConfig::default())?);
//!     let store = Arc::new(SessionStore::new());
//!
//!     SessionDispatcher::new(adapter.clone(), store.clone()).spawn();
//!     adapter.initialize().await?;
//!
//!     let mut subscription = store.subscribe().await;
//!     while let Some(event) = subscription.recv().await {
//!         println!("{}", event.name());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  AdapterEvent  ┌───────────────────┐
//! │   Adapter    │───────────────▶│ SessionDispatcher │
//! │ (bridge/mock)│                └─────────┬─────────┘
//! └──────▲───────┘                          │ LifecycleEvent
//!        │ send_message         ┌───────────▼───────────┐
//!        │                      │     SessionStore      │
//! ┌──────┴───────┐   is_ready   │  ┌─────────────────┐  │
//! │   outbound   │─────────────▶│  │ SessionMachine  │  │
//! └──────────────┘              │  └─────────────────┘  │
//!                               │  ┌─────────────────┐  │
//!                               │  │  BroadcastHub   │──┼──▶ subscribers
//!                               │  └─────────────────┘  │
//!                               └───────────────────────┘
//! ```

pub mod adapter;
pub mod error;
pub mod events;
pub mod outbound;
pub mod pairing;
pub mod session;

// Re-export key types for convenience
pub use adapter::{
    AdapterEvent, BridgeAdapter, BridgeConfig, MockAdapter, SentMessage, SessionAdapter,
};
pub use error::{AdapterError, ErrorKind, RenderError, SendError, SessionError};
pub use events::{BroadcastHub, HubEvent, SubscriberId, Subscription};
pub use outbound::{OutboundMessageRequest, normalize_destination, send_message};
pub use session::{
    DEFAULT_IDENTITY_TIMEOUT, IdentityInfo, LifecycleEvent, SessionDispatcher, SessionMachine,
    SessionSnapshot, SessionState, SessionStore,
};
