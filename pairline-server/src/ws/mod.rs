//! WebSocket module for real-time session events

mod connection;

pub use connection::ws_handler;
