//! In-memory [`PubSub`] used by the engine and server tests. Records every
//! subscribe/unsubscribe and lets a test push messages or faults into an open
//! subscription.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::PubSub;
use crate::utils::RelayError;

type Feed = UnboundedSender<Result<Bytes, RelayError>>;

#[derive(Default)]
struct MockState {
    subscribed: Vec<String>,
    unsubscribed: Vec<String>,
    feeds: HashMap<String, Feed>,
    refuse_subscribe: bool,
}

#[derive(Clone, Default)]
pub struct MockPubSub {
    state: Arc<Mutex<MockState>>,
}

pub struct MockSubscription {
    name: String,
    rx: UnboundedReceiver<Result<Bytes, RelayError>>,
}

impl MockPubSub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `subscribe` fail.
    pub fn refuse_subscribes(&self) {
        self.state.lock().unwrap().refuse_subscribe = true;
    }

    /// Push a message into the open subscription for `name`.
    pub fn publish(&self, name: &str, payload: &[u8]) {
        let state = self.state.lock().unwrap();
        let feed = state.feeds.get(name).expect("no subscription for channel");
        feed.send(Ok(Bytes::copy_from_slice(payload))).unwrap();
    }

    /// Push a transport error into the open subscription for `name`; the next
    /// poll on it fails.
    pub fn break_subscription(&self, name: &str) {
        let state = self.state.lock().unwrap();
        let feed = state.feeds.get(name).expect("no subscription for channel");
        feed.send(Err(RelayError::Transport(format!("'{name}' broken"))))
            .unwrap();
    }

    pub fn subscribe_count(&self, name: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.subscribed.iter().filter(|n| *n == name).count()
    }

    pub fn unsubscribe_count(&self, name: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.unsubscribed.iter().filter(|n| *n == name).count()
    }

    pub fn has_feed(&self, name: &str) -> bool {
        self.state.lock().unwrap().feeds.contains_key(name)
    }
}

impl PubSub for MockPubSub {
    type Subscription = MockSubscription;

    async fn subscribe(&self, name: &str) -> Result<MockSubscription, RelayError> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_subscribe {
            return Err(RelayError::Transport("subscribe refused".into()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        state.subscribed.push(name.to_string());
        state.feeds.insert(name.to_string(), tx);
        Ok(MockSubscription {
            name: name.to_string(),
            rx,
        })
    }

    async fn poll(
        &self,
        subscription: &mut MockSubscription,
        wait: Duration,
    ) -> Result<Option<Bytes>, RelayError> {
        match tokio::time::timeout(wait, subscription.rx.recv()).await {
            Err(_elapsed) => Ok(None),
            Ok(Some(item)) => item.map(Some),
            Ok(None) => Err(RelayError::Transport(format!(
                "'{}' feed dropped",
                subscription.name
            ))),
        }
    }

    async fn unsubscribe(&self, subscription: MockSubscription) -> Result<(), RelayError> {
        let mut state = self.state.lock().unwrap();
        state.feeds.remove(&subscription.name);
        state.unsubscribed.push(subscription.name);
        Ok(())
    }
}
