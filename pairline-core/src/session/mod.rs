//! Session lifecycle

pub mod dispatcher;
pub mod state;
pub mod store;

// Re-export key types for convenience
pub use dispatcher::{DEFAULT_IDENTITY_TIMEOUT, SessionDispatcher};
pub use state::{
    Broadcast, IdentityInfo, LifecycleEvent, SessionMachine, SessionSnapshot, SessionState,
};
pub use store::SessionStore;
