use std::collections::HashMap;
use std::sync::{Mutex, Weak};

use bytes::Bytes;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use super::registry::Registry;
use super::subscriber::Subscriber;
use crate::pubsub::PubSub;
use crate::utils::RelayError;

/// A named upstream subscription plus the set of sessions receiving its
/// messages.
///
/// Membership and the teardown decision live behind one sync lock; the
/// subscription handle lives in its own async slot so the pump can hold it
/// across a poll while attach/detach proceed. The registry lock is never taken
/// while either of these is held.
pub struct Channel<T: PubSub> {
    name: String,
    registry: Weak<Registry<T>>,
    subscription: AsyncMutex<Option<T::Subscription>>,
    inner: Mutex<ChannelInner>,
}

struct ChannelInner {
    subscribers: HashMap<Uuid, Subscriber>,
    /// Set exactly once, in the same critical section that observes the
    /// membership going empty. Once set, attach refuses and no second detach
    /// can re-run destroy.
    condemned: bool,
}

impl<T: PubSub> std::fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<T: PubSub> Channel<T> {
    pub(crate) fn new(
        name: &str,
        registry: Weak<Registry<T>>,
        subscription: T::Subscription,
    ) -> Self {
        Self {
            name: name.to_string(),
            registry,
            subscription: AsyncMutex::new(Some(subscription)),
            inner: Mutex::new(ChannelInner {
                subscribers: HashMap::new(),
                condemned: false,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().subscribers.len()
    }

    /// Attach a new subscriber identified by `client_id`.
    ///
    /// Fails when the id is not a well-formed UUID, when that id is already
    /// attached, or when this instance has committed to teardown. In the last
    /// case the caller should look the name up again, which yields a fresh
    /// channel once the condemned one is gone from the registry.
    pub fn attach(
        &self,
        sender: UnboundedSender<WsMessage>,
        client_id: &str,
    ) -> Result<Subscriber, RelayError> {
        let id = Uuid::parse_str(client_id)?;
        let mut inner = self.inner.lock().unwrap();
        if inner.condemned {
            return Err(RelayError::ChannelClosed);
        }
        if inner.subscribers.contains_key(&id) {
            return Err(RelayError::DuplicateSubscriber(id));
        }
        let subscriber = Subscriber::new(id, self.name.clone(), sender);
        inner.subscribers.insert(id, subscriber.clone());
        Ok(subscriber)
    }

    /// Remove a subscriber and close its session; tear the channel down if it
    /// was the last one. Safe to call twice for the same subscriber and for
    /// subscribers that were never attached.
    pub async fn detach(&self, subscriber: &Subscriber) {
        subscriber.shutdown();
        let teardown = {
            let mut inner = self.inner.lock().unwrap();
            inner.subscribers.remove(&subscriber.id());
            if inner.subscribers.is_empty() && !inner.condemned {
                inner.condemned = true;
                true
            } else {
                false
            }
        };
        if teardown {
            self.destroy().await;
        }
    }

    /// Remove this channel from the registry and release the upstream
    /// subscription. Only ever reached by the one detach that committed the
    /// teardown decision.
    async fn destroy(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        // Drop out of the registry first so no new session can find this
        // instance while the subscription is being released.
        registry.remove(&self.name).await;
        if let Some(subscription) = self.subscription.lock().await.take() {
            if let Err(e) = registry.transport().unsubscribe(subscription).await {
                warn!(channel = %self.name, "unsubscribe failed: {e}");
            }
        }
        debug!(channel = %self.name, "channel destroyed");
    }

    /// Drain the upstream subscription and fan each message out to the current
    /// membership. Runs as its own task, spawned by whichever session created
    /// the channel.
    ///
    /// The bounded poll is what lets the loop notice teardown: destroy empties
    /// the subscription slot, and the next iteration finds it empty and exits.
    /// A transport error also ends the loop; subscribers still attached at
    /// that point stay attached and are cleaned up by their own disconnects.
    pub async fn pump(self: std::sync::Arc<Self>) {
        loop {
            let Some(registry) = self.registry.upgrade() else {
                break;
            };
            let mut slot = self.subscription.lock().await;
            let Some(subscription) = slot.as_mut() else {
                break;
            };
            match registry
                .transport()
                .poll(subscription, registry.poll_timeout())
                .await
            {
                Ok(None) => continue,
                Ok(Some(payload)) => {
                    drop(slot);
                    self.broadcast(payload);
                }
                Err(e) => {
                    error!(channel = %self.name, "subscription closed: {e}");
                    break;
                }
            }
        }
        debug!(channel = %self.name, "pump stopped");
    }

    /// Deliver one payload to every currently attached subscriber. Best
    /// effort: a dead subscriber is skipped, not retried and not detached.
    pub(crate) fn broadcast(&self, payload: Bytes) {
        let subscribers: Vec<Subscriber> = {
            let inner = self.inner.lock().unwrap();
            inner.subscribers.values().cloned().collect()
        };
        for subscriber in subscribers {
            if let Err(e) = subscriber.send(payload.clone()) {
                warn!(channel = %self.name, "dropping frame: {e}");
            }
        }
    }
}
