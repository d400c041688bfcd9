use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Utf8Bytes;
use tracing::debug;

use beacon_types::WireMessage;

/// Intentional shutdown. The only close code that does not trigger a
/// reconnect.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Reported when the peer vanished without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Reported when a close frame carried no status code.
pub const NO_STATUS_RECEIVED: u16 = 1005;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Text(String),
    Closed { code: u16, reason: String },
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    Text(String),
    Close(u16),
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport is closed")]
    Closed,
}

/// An open duplex transport, seen as two channels.
pub struct Connection {
    pub outbound: mpsc::UnboundedSender<ClientFrame>,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl Connection {
    pub fn send(&self, message: &WireMessage) -> Result<(), TransportError> {
        self.outbound
            .send(ClientFrame::Text(message.encode()))
            .map_err(|_| TransportError::Closed)
    }

    pub fn close(&self, code: u16) {
        let _ = self.outbound.send(ClientFrame::Close(code));
    }
}

/// Opens transports for the supervisor.
pub trait Connector: Send + Sync + 'static {
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<Connection, TransportError>>;
}

/// WebSocket transport over tokio-tungstenite.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<Connection, TransportError>> {
        let url = url.to_string();
        Box::pin(async move {
            let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
                .await
                .map_err(|e| TransportError::Handshake(e.to_string()))?;

            let (mut sink, mut stream) = ws_stream.split();
            let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientFrame>();
            let (event_tx, event_rx) = mpsc::unbounded_channel::<TransportEvent>();

            tokio::spawn(async move {
                while let Some(frame) = stream.next().await {
                    let event = match frame {
                        Ok(Message::Text(text)) => TransportEvent::Text(text.as_str().to_owned()),
                        Ok(Message::Close(frame)) => {
                            let (code, reason) = frame
                                .map(|f| (u16::from(f.code), f.reason.as_str().to_owned()))
                                .unwrap_or((NO_STATUS_RECEIVED, String::new()));
                            let _ = event_tx.send(TransportEvent::Closed { code, reason });
                            return;
                        }
                        // Pings are answered by tungstenite itself
                        Ok(_) => continue,
                        Err(e) => {
                            let _ = event_tx.send(TransportEvent::Error(e.to_string()));
                            return;
                        }
                    };
                    if event_tx.send(event).is_err() {
                        return;
                    }
                }
                let _ = event_tx.send(TransportEvent::Closed {
                    code: ABNORMAL_CLOSURE,
                    reason: "connection dropped".into(),
                });
            });

            tokio::spawn(async move {
                while let Some(frame) = out_rx.recv().await {
                    let result = match frame {
                        ClientFrame::Text(text) => sink.send(Message::Text(text.into())).await,
                        ClientFrame::Close(code) => {
                            let close = CloseFrame {
                                code: CloseCode::from(code),
                                reason: Utf8Bytes::from_static("client closing"),
                            };
                            let _ = sink.send(Message::Close(Some(close))).await;
                            let _ = sink.close().await;
                            break;
                        }
                    };
                    if let Err(e) = result {
                        debug!("socket write failed: {}", e);
                        break;
                    }
                }
            });

            Ok(Connection {
                outbound: out_tx,
                events: event_rx,
            })
        })
    }
}
