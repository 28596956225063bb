//! # wsrelay
//!
//! `wsrelay` is a real-time fan-out relay: external processes publish messages
//! onto Redis pub/sub channels, and this service forwards each message to every
//! WebSocket client subscribed to that channel.
//!
//! ## Core Modules
//!
//! - `relay`: the fan-out engine: the channel registry, per-channel pump
//!   tasks, and subscriber handles.
//! - `pubsub`: the upstream transport seam (Redis in production, a mock in
//!   tests).
//! - `server`: the WebSocket listener and per-session handling.
//! - `config`: loading and merging server configuration.
//! - `utils`: shared pieces such as the crate error type and logging setup.

pub mod config;
pub mod pubsub;
pub mod relay;
pub mod server;
pub mod utils;
