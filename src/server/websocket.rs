use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use tokio::sync::mpsc::UnboundedSender;

use crate::pubsub::PubSub;
use crate::relay::{Channel, Registry, Subscriber};
use crate::utils::RelayError;

pub async fn start_websocket_server<T: PubSub>(
    addr: &str,
    registry: Arc<Registry<T>>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("websocket server listening on ws://{}", addr);
    serve(listener, registry).await
}

/// Accept loop over an already-bound listener; one spawned task per session.
pub async fn serve<T: PubSub>(
    listener: TcpListener,
    registry: Arc<Registry<T>>,
) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        tokio::spawn(handle_session(stream, peer, Arc::clone(&registry)));
    }
}

/// Split `/api/notifier/{channel}/{client_id}` into its two parameters.
pub(crate) fn parse_route(path: &str) -> Option<(String, String)> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match segments.as_slice() {
        ["api", "notifier", channel, client_id] if !channel.is_empty() && !client_id.is_empty() => {
            Some((channel.to_string(), client_id.to_string()))
        }
        _ => None,
    }
}

/// Attach one session to a channel, starting the channel's pump when the
/// channel was just created.
///
/// The pump starts before the attach is tried: the creating session can lose
/// an attach race to another session on the same path, and a live channel
/// must be pumped for whoever won. Teardown still arrives through the
/// surviving subscribers' detach, which stops the pump.
pub(crate) fn attach_session<T: PubSub>(
    channel: &Arc<Channel<T>>,
    created: bool,
    sender: UnboundedSender<WsMessage>,
    client_id: &str,
) -> Result<Subscriber, RelayError> {
    if created {
        tokio::spawn(Arc::clone(channel).pump());
    }
    channel.attach(sender, client_id)
}

async fn handle_session<T: PubSub>(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<Registry<T>>,
) {
    let mut route = None;
    let callback = |req: &Request, response: Response| match parse_route(req.uri().path()) {
        Some(parsed) => {
            route = Some(parsed);
            Ok(response)
        }
        None => {
            let mut refusal = ErrorResponse::new(Some("no such route".to_string()));
            *refusal.status_mut() = StatusCode::NOT_FOUND;
            Err(refusal)
        }
    };

    let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer, "websocket handshake rejected: {e}");
            return;
        }
    };
    let Some((channel_name, client_id)) = route else {
        return;
    };

    // Reject a bad id before the registry sees the name, so it cannot
    // half-create a channel that attach would then refuse.
    if let Err(e) = Uuid::parse_str(&client_id) {
        warn!(%peer, client = %client_id, "invalid client id: {e}");
        return;
    }

    // Every client gets its own channel key, matching the route contract.
    let key = format!("{channel_name}-{client_id}");
    info!(%peer, channel = %key, "incoming session");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    // Forward frames queued by the pump to the socket. Ends once the close
    // frame goes out or every sender is gone.
    let forward_key = key.clone();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = msg.is_close();
            if ws_sender.send(msg).await.is_err() || closing {
                break;
            }
        }
        debug!(channel = %forward_key, "send loop closed");
    });

    let (channel, subscriber) = loop {
        let (channel, existed) = match registry.get_or_create(&key).await {
            Ok(found) => found,
            Err(e) => {
                error!(channel = %key, "upstream subscribe failed: {e}");
                return;
            }
        };
        match attach_session(&channel, !existed, tx.clone(), &client_id) {
            Ok(subscriber) => break (channel, subscriber),
            // Lost the race against a teardown; the next lookup constructs a
            // fresh channel.
            Err(RelayError::ChannelClosed) => continue,
            Err(e) => {
                warn!(channel = %key, "attach refused: {e}");
                return;
            }
        }
    };
    info!(channel = %subscriber.channel_name(), subscriber = %subscriber.id(), "subscriber attached");

    // Server-to-client protocol: inbound frames are drained purely to notice
    // the disconnect.
    while let Some(Ok(_)) = ws_receiver.next().await {}

    channel.detach(&subscriber).await;
    info!(channel = %key, subscriber = %subscriber.id(), "subscriber detached");
}
