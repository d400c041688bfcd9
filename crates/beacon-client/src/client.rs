use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use crate::bridge::run_bridge;
use crate::config::ClientConfig;
use crate::platform::Platform;
use crate::store::NotificationFeed;
use crate::supervisor::{ConnectionStatus, Supervisor, SupervisorHandle};
use crate::toast::ToastScheduler;
use crate::transport::{Connector, WsConnector};

/// Everything one view needs: a supervised connection feeding a store and
/// its toasts.
pub struct NotificationClient {
    feed: NotificationFeed,
    toasts: ToastScheduler,
    supervisor: SupervisorHandle,
    bridge: JoinHandle<()>,
}

impl NotificationClient {
    pub fn start(config: ClientConfig, connector: Arc<dyn Connector>, platform: Platform) -> Self {
        let feed = NotificationFeed::new();
        let toasts = ToastScheduler::new(feed.clone(), config.toast_duration);

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let bridge = tokio::spawn(run_bridge(inbound_rx, feed.clone(), toasts.clone()));
        let supervisor = Supervisor::spawn(config.supervisor, connector, platform, inbound_tx);

        Self {
            feed,
            toasts,
            supervisor,
            bridge,
        }
    }

    /// WebSocket transport on a platform that is always visible and online.
    pub fn connect(config: ClientConfig) -> Self {
        Self::start(config, Arc::new(WsConnector), Platform::always_available())
    }

    pub fn feed(&self) -> &NotificationFeed {
        &self.feed
    }

    pub fn toasts(&self) -> &ToastScheduler {
        &self.toasts
    }

    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.supervisor.status()
    }

    pub fn current_status(&self) -> ConnectionStatus {
        self.supervisor.current()
    }

    /// Close the connection normally, then stop the bridge and every toast
    /// timer. Nothing touches the store afterwards.
    pub async fn shutdown(self) {
        self.supervisor.shutdown().await;
        self.bridge.abort();
        let _ = self.bridge.await;
        self.toasts.shutdown();
        info!("notification client shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::future::BoxFuture;
    use parking_lot::Mutex;

    use beacon_types::{Category, NotificationKind, NotificationPayload, WireMessage};

    use super::*;
    use crate::supervisor::ConnectionState;
    use crate::transport::{ClientFrame, Connection, TransportError, TransportEvent};

    /// Hands out a single scripted connection, then refuses.
    struct OneShot(Mutex<Option<Connection>>);

    impl Connector for OneShot {
        fn connect(&self, _url: &str) -> BoxFuture<'static, Result<Connection, TransportError>> {
            let conn = self.0.lock().take();
            Box::pin(async move { conn.ok_or_else(|| TransportError::Handshake("no more".into())) })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn inbound_notification_reaches_feed_and_toasts() {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (frame_tx, mut frame_rx) = mpsc::unbounded_channel();
        let connector = OneShot(Mutex::new(Some(Connection {
            outbound: frame_tx,
            events: event_rx,
        })));

        let client = NotificationClient::start(
            ClientConfig::new("ws://test/ws"),
            Arc::new(connector),
            Platform::always_available(),
        );
        let mut status = client.status();
        status.wait_for(|s| s.state == ConnectionState::Open).await.unwrap();

        let payload = NotificationPayload {
            kind: NotificationKind::Success,
            title: "Saved".into(),
            message: "X".into(),
            id: "srv".into(),
            date: chrono::Utc::now(),
            category: Some(Category::Student),
            action_link: None,
            action_text: None,
        };
        event_tx
            .send(TransportEvent::Text(WireMessage::Notification(payload).encode()))
            .unwrap();

        let mut unread = client.feed().subscribe_unread();
        unread.wait_for(|count| *count == 1).await.unwrap();
        assert_eq!(client.feed().snapshot()[0].category, Some(Category::Student));
        assert_eq!(client.toasts().visible().len(), 1);

        let feed = client.feed().clone();
        client.shutdown().await;

        // Shutdown cancelled the toast timer, so the entry stays unread
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(feed.unread_count(), 1);

        let mut frames = Vec::new();
        while let Ok(frame) = frame_rx.try_recv() {
            frames.push(frame);
        }
        assert_eq!(frames.last(), Some(&ClientFrame::Close(1000)));
    }
}
