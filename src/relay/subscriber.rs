use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::utils::RelayError;

/// One connected endpoint attached to a channel.
///
/// Holds the send half of the session: an unbounded queue drained by the
/// connection's forward task, so sending never blocks the pump. Cloneable
/// handle; the channel keeps one clone in its membership map and the session
/// handler keeps another for detach.
#[derive(Debug, Clone)]
pub struct Subscriber {
    id: Uuid,
    channel: String,
    sender: UnboundedSender<WsMessage>,
    closed: Arc<AtomicBool>,
}

impl Subscriber {
    pub(crate) fn new(id: Uuid, channel: String, sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id,
            channel,
            sender,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name of the channel this subscriber is attached to. Diagnostics only.
    pub fn channel_name(&self) -> &str {
        &self.channel
    }

    /// Queue a binary frame for this subscriber. Fails only when the session
    /// is gone; the caller decides whether that matters.
    pub fn send(&self, payload: Bytes) -> Result<(), RelayError> {
        self.sender
            .send(WsMessage::binary(payload))
            .map_err(|_| RelayError::SubscriberGone(self.id))
    }

    /// Close the session. The first call queues a Close frame; every later
    /// call is a no-op.
    pub fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.sender.send(WsMessage::Close(None));
        }
    }
}
