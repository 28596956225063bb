use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::info;

use super::channel::Channel;
use crate::pubsub::PubSub;
use crate::utils::RelayError;

/// Process-wide map from channel name to live [`Channel`].
///
/// Owned behind an `Arc` and handed to every session; channels hold a `Weak`
/// back-reference so teardown can remove them without a reference cycle.
pub struct Registry<T: PubSub> {
    transport: T,
    poll_timeout: Duration,
    channels: Mutex<HashMap<String, Arc<Channel<T>>>>,
}

impl<T: PubSub> Registry<T> {
    pub fn new(transport: T, poll_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            transport,
            poll_timeout,
            channels: Mutex::new(HashMap::new()),
        })
    }

    /// Look up `name`, creating the channel (and its upstream subscription) on
    /// a miss. The returned flag is `true` when the channel already existed.
    ///
    /// The map lock is held across the subscribe call, so concurrent first
    /// callers for one name are serialized: exactly one subscribes and
    /// inserts, the rest observe the hit. A failed subscribe leaves nothing
    /// behind.
    pub async fn get_or_create(
        self: &Arc<Self>,
        name: &str,
    ) -> Result<(Arc<Channel<T>>, bool), RelayError> {
        let mut channels = self.channels.lock().await;
        if let Some(channel) = channels.get(name) {
            return Ok((Arc::clone(channel), true));
        }
        let subscription = self.transport.subscribe(name).await?;
        let channel = Arc::new(Channel::new(name, Arc::downgrade(self), subscription));
        channels.insert(name.to_string(), Arc::clone(&channel));
        info!(channel = %name, "channel created");
        Ok((channel, false))
    }

    /// Drop `name` from the map. No-op when it is already gone, so a teardown
    /// racing an earlier removal stays silent.
    pub async fn remove(&self, name: &str) {
        self.channels.lock().await.remove(name);
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.channels.lock().await.contains_key(name)
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.lock().await.len()
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }
}
