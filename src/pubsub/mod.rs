//! The `pubsub` module is the seam to the upstream pub/sub broker.
//!
//! The relay engine only depends on the [`PubSub`] trait: subscribe to a named
//! channel, poll the subscription with a bounded wait, and release it. The
//! production implementation is `RedisPubSub` in the `redis` submodule; tests
//! use the mock in `mock`.

pub mod redis;

#[cfg(test)]
pub mod mock;

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

use crate::utils::RelayError;

/// Upstream pub/sub transport.
///
/// One [`Subscription`](PubSub::Subscription) is an exclusively owned handle to
/// one named channel on the broker. Payloads are opaque bytes and are forwarded
/// unmodified.
pub trait PubSub: Send + Sync + 'static {
    type Subscription: Send + 'static;

    /// Open a subscription to `name`.
    fn subscribe(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Self::Subscription, RelayError>> + Send;

    /// Wait up to `wait` for the next message.
    ///
    /// `Ok(None)` means the wait elapsed with nothing to deliver; an `Err`
    /// means the subscription is broken and will yield nothing further.
    fn poll(
        &self,
        subscription: &mut Self::Subscription,
        wait: Duration,
    ) -> impl Future<Output = Result<Option<Bytes>, RelayError>> + Send;

    /// Release a subscription.
    fn unsubscribe(
        &self,
        subscription: Self::Subscription,
    ) -> impl Future<Output = Result<(), RelayError>> + Send;
}
