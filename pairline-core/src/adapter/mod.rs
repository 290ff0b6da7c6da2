//! Session adapters
//!
//! [`SessionAdapter`] is the seam to the automation engine. [`BridgeAdapter`]
//! drives a bridge sidecar; [`MockAdapter`] is scripted for tests.

pub mod bridge;
pub mod config;
pub mod mock;
pub mod traits;

pub use bridge::BridgeAdapter;
pub use config::BridgeConfig;
pub use mock::MockAdapter;
pub use traits::{AdapterEvent, SentMessage, SessionAdapter};
