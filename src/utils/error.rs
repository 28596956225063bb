//! The `error` module defines the error type used within the `wsrelay` application.
//!
//! This module centralizes error handling, providing a consistent way to
//! represent and propagate errors throughout the system.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the relay engine and the upstream pub/sub transport.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The upstream pub/sub transport failed (broken connection, refused
    /// subscribe, closed message stream).
    #[error("pubsub transport error: {0}")]
    Transport(String),

    /// The subscriber identifier from the request path is not a valid UUID.
    #[error("invalid subscriber id: {0}")]
    InvalidSubscriberId(#[from] uuid::Error),

    /// A subscriber with this id is already attached to the channel.
    #[error("subscriber {0} is already attached")]
    DuplicateSubscriber(Uuid),

    /// The channel has committed to teardown; callers should look the name up
    /// again to obtain a fresh instance.
    #[error("channel is being torn down")]
    ChannelClosed,

    /// The subscriber's session is gone; its send half is closed.
    #[error("subscriber {0} disconnected")]
    SubscriberGone(Uuid),
}

impl From<redis::RedisError> for RelayError {
    fn from(err: redis::RedisError) -> Self {
        RelayError::Transport(err.to_string())
    }
}
