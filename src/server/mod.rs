//! The `server` module owns the inbound side of the relay: the TCP listener,
//! the WebSocket handshake with route matching, and the per-session task that
//! ties a connection to a channel in the registry.

pub mod websocket;

pub use websocket::{serve, start_websocket_server};
