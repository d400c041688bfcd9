use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use beacon_types::{WireError, WireMessage};

use crate::registry::{ConnectionId, ConnectionRegistry, Outbound, Registration};

pub const WELCOME_MESSAGE: &str = "Connected to notification server";

/// Drive one accepted WebSocket until it closes or the liveness sweep
/// terminates it. Reconnecting is the client's job; this never retries.
pub async fn handle_connection(socket: WebSocket, registry: ConnectionRegistry) {
    let Registration {
        id,
        sender: reply_tx,
        receiver: mut outbound_rx,
    } = registry.register();

    let (mut sender, mut receiver) = socket.split();

    info!(%id, connections = registry.len(), "client connected");

    let welcome = WireMessage::system(WELCOME_MESSAGE).encode();
    if sender.send(Message::Text(welcome.into())).await.is_err() {
        registry.unregister(id);
        return;
    }

    // Writer: everything the registry, the broadcaster and our own reader
    // queue for this client goes out through here.
    let mut send_task = tokio::spawn(async move {
        while let Some(outbound) = outbound_rx.recv().await {
            let result = match outbound {
                Outbound::Text(text) => sender.send(Message::Text(text.into())).await,
                Outbound::Probe => sender.send(Message::Ping(Bytes::new())).await,
                // Dropping the sink tears the socket down without a close handshake
                Outbound::Terminate => break,
            };
            if let Err(e) = result {
                debug!(%id, "write failed: {}", e);
                break;
            }
        }
    });

    let pong_registry = registry.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            let msg = match frame {
                Ok(msg) => msg,
                Err(e) => {
                    debug!(%id, "read failed: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => handle_text(id, text.as_str(), &reply_tx),
                Message::Pong(_) => pong_registry.mark_alive(id),
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    registry.unregister(id);
    info!(%id, connections = registry.len(), "client disconnected");
}

fn handle_text(id: ConnectionId, text: &str, reply_tx: &mpsc::UnboundedSender<Outbound>) {
    match WireMessage::decode(text) {
        Ok(WireMessage::KeepalivePing(_)) => {
            trace!(%id, "keepalive ping");
            let pong = WireMessage::keepalive_pong("pong").encode();
            let _ = reply_tx.send(Outbound::Text(pong));
        }
        Ok(other) => {
            debug!(%id, kind = other.kind(), "ignoring client-sent message");
        }
        Err(WireError::UnknownKind(kind)) => {
            warn!(%id, "dropping message of unknown kind '{}'", kind);
        }
        Err(e) => {
            let raw: String = text.chars().take(200).collect();
            warn!(%id, "dropping bad message: {} -- raw: {}", e, raw);
        }
    }
}
