//! Real-time event fan-out

pub mod hub;
pub mod types;

pub use hub::{BroadcastHub, SubscriberId, Subscription};
pub use types::HubEvent;
