use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use redis::Client;
use redis::aio::PubSub as AsyncPubSub;

use super::PubSub;
use crate::utils::RelayError;

/// Redis-backed implementation of [`PubSub`].
///
/// Each subscription gets its own pub/sub connection, so tearing one channel
/// down never disturbs the others.
#[derive(Clone)]
pub struct RedisPubSub {
    client: Client,
}

/// An open Redis pub/sub connection subscribed to a single channel.
pub struct RedisSubscription {
    pubsub: AsyncPubSub,
    name: String,
}

impl RedisPubSub {
    /// Build a transport from a `redis://` URL. Connections are opened lazily,
    /// per subscription.
    pub fn connect(url: &str) -> Result<Self, RelayError> {
        let client = Client::open(url)?;
        Ok(Self { client })
    }
}

impl PubSub for RedisPubSub {
    type Subscription = RedisSubscription;

    async fn subscribe(&self, name: &str) -> Result<RedisSubscription, RelayError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(name).await?;
        Ok(RedisSubscription {
            pubsub,
            name: name.to_string(),
        })
    }

    async fn poll(
        &self,
        subscription: &mut RedisSubscription,
        wait: Duration,
    ) -> Result<Option<Bytes>, RelayError> {
        match tokio::time::timeout(wait, subscription.pubsub.on_message().next()).await {
            Err(_elapsed) => Ok(None),
            Ok(Some(msg)) => Ok(Some(Bytes::copy_from_slice(msg.get_payload_bytes()))),
            Ok(None) => Err(RelayError::Transport(format!(
                "pubsub stream closed for '{}'",
                subscription.name
            ))),
        }
    }

    async fn unsubscribe(&self, mut subscription: RedisSubscription) -> Result<(), RelayError> {
        subscription.pubsub.unsubscribe(&subscription.name).await?;
        Ok(())
    }
}
