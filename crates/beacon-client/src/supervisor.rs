use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use beacon_types::{NotificationPayload, WireError, WireMessage};

use crate::config::SupervisorConfig;
use crate::platform::Platform;
use crate::transport::{
    ClientFrame, Connection, Connector, NORMAL_CLOSURE, TransportError, TransportEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    ReconnectWait,
    Terminated,
}

/// What the supervisor is waiting for while in `ReconnectWait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPlan {
    After(Duration),
    Cooldown(Duration),
    WhenVisible,
    WhenOnline,
}

/// Observable connection state. Transport failures only ever surface here;
/// they are never returned as errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub connected: bool,
    /// Reconnect waits scheduled since the last successful open.
    pub attempt: u32,
    pub last_error: Option<String>,
    pub next_retry: Option<RetryPlan>,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Idle,
            connected: false,
            attempt: 0,
            last_error: None,
            next_retry: None,
        }
    }
}

enum Outcome {
    /// Teardown was requested while open.
    Terminated,
    /// The server closed with the normal code.
    ClosedNormally,
    /// Error or unclean close.
    Lost(String),
}

/// How a timed reconnect wait ended.
enum Wake {
    Elapsed,
    Cancelled,
    /// The page was hidden or the device went offline.
    Interrupted,
}

/// Owns one logical connection: handshake, keepalive and reconnection.
pub struct Supervisor {
    config: SupervisorConfig,
    connector: Arc<dyn Connector>,
    platform: Platform,
    notifications: mpsc::UnboundedSender<NotificationPayload>,
    status: watch::Sender<ConnectionStatus>,
    shutdown: CancellationToken,
    attempt: u32,
}

/// Handle to a running supervisor. Dropping it does not stop the task; call
/// [`shutdown`](Self::shutdown).
pub struct SupervisorHandle {
    status: watch::Receiver<ConnectionStatus>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl SupervisorHandle {
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub fn current(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    /// Deliberate teardown: cancels every timer and listener and closes a
    /// live transport with the normal code, so it cannot trigger a reconnect.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            warn!("supervisor task ended abnormally: {}", e);
        }
    }
}

impl Supervisor {
    /// Start supervising. Inbound notifications are forwarded to
    /// `notifications` in arrival order.
    pub fn spawn(
        config: SupervisorConfig,
        connector: Arc<dyn Connector>,
        platform: Platform,
        notifications: mpsc::UnboundedSender<NotificationPayload>,
    ) -> SupervisorHandle {
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::default());
        let shutdown = CancellationToken::new();

        let supervisor = Supervisor {
            config,
            connector,
            platform,
            notifications,
            status: status_tx,
            shutdown: shutdown.clone(),
            attempt: 0,
        };

        SupervisorHandle {
            status: status_rx,
            shutdown,
            task: tokio::spawn(supervisor.run()),
        }
    }

    async fn run(mut self) {
        if !self.pause(self.config.initial_delay).await {
            return self.terminate();
        }

        loop {
            self.status.send_modify(|s| {
                s.state = ConnectionState::Connecting;
                s.next_retry = None;
            });
            debug!(url = %self.config.url, "connecting");

            let limit = self.config.connect_timeout;
            let connect = tokio::time::timeout(limit, self.connector.connect(&self.config.url));
            let result = tokio::select! {
                _ = self.shutdown.cancelled() => return self.terminate(),
                result = connect => result.unwrap_or(Err(TransportError::Timeout(limit))),
            };

            let failure = match result {
                Ok(conn) => match self.drive(conn).await {
                    Outcome::Terminated => return self.terminate(),
                    Outcome::ClosedNormally => {
                        info!("server closed the notification socket normally; not reconnecting");
                        self.status.send_modify(|s| {
                            s.state = ConnectionState::Idle;
                            s.connected = false;
                        });
                        self.shutdown.cancelled().await;
                        return self.terminate();
                    }
                    Outcome::Lost(reason) => reason,
                },
                Err(e) => e.to_string(),
            };

            warn!("notification socket unavailable: {}", failure);
            if !self.wait_to_reconnect(failure).await {
                return self.terminate();
            }
        }
    }

    async fn drive(&mut self, conn: Connection) -> Outcome {
        let Connection {
            outbound,
            mut events,
        } = conn;
        let send_ping = || {
            outbound
                .send(ClientFrame::Text(WireMessage::keepalive_ping("ping").encode()))
                .is_ok()
        };

        self.attempt = 0;
        self.status.send_modify(|s| {
            s.state = ConnectionState::Open;
            s.connected = true;
            s.attempt = 0;
            s.last_error = None;
            s.next_retry = None;
        });
        info!(url = %self.config.url, "notification socket open");

        // Ping right away so the server sees activity before its first liveness sweep
        if !send_ping() {
            return Outcome::Lost("keepalive write failed".into());
        }

        let period = self.config.keepalive_interval.max(Duration::from_millis(1));
        let mut keepalive = tokio::time::interval_at(Instant::now() + period, period);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = outbound.send(ClientFrame::Close(NORMAL_CLOSURE));
                    return Outcome::Terminated;
                }
                _ = keepalive.tick() => {
                    if !send_ping() {
                        return Outcome::Lost("keepalive write failed".into());
                    }
                }
                event = events.recv() => match event {
                    Some(TransportEvent::Text(text)) => self.handle_text(&text),
                    Some(TransportEvent::Closed { code, .. }) if code == NORMAL_CLOSURE => {
                        return Outcome::ClosedNormally;
                    }
                    Some(TransportEvent::Closed { code, reason }) => {
                        return Outcome::Lost(if reason.is_empty() {
                            format!("closed with code {}", code)
                        } else {
                            format!("closed with code {}: {}", code, reason)
                        });
                    }
                    Some(TransportEvent::Error(e)) => return Outcome::Lost(e),
                    None => return Outcome::Lost("transport dropped".into()),
                },
            }
        }
    }

    fn handle_text(&self, text: &str) {
        match WireMessage::decode(text) {
            Ok(WireMessage::Notification(payload)) => {
                if self.notifications.send(payload).is_err() {
                    debug!("notification arrived with no consumer attached");
                }
            }
            Ok(WireMessage::System(payload)) => info!("server: {}", payload.message),
            Ok(WireMessage::KeepalivePong(_)) => trace!("keepalive pong"),
            Ok(WireMessage::KeepalivePing(_)) => debug!("ignoring keepalive ping from server"),
            Err(WireError::UnknownKind(kind)) => warn!("dropping message of unknown kind '{}'", kind),
            Err(e) => warn!("dropping bad message: {}", e),
        }
    }

    /// Reconnect-Wait. Returns false if teardown was requested meanwhile.
    async fn wait_to_reconnect(&mut self, reason: String) -> bool {
        self.status.send_modify(|s| {
            s.connected = false;
            s.last_error = Some(reason);
        });

        loop {
            if !self.platform.is_visible() {
                self.enter_wait(RetryPlan::WhenVisible);
                debug!("page hidden; deferring reconnect until visible");
                tokio::select! {
                    _ = self.shutdown.cancelled() => return false,
                    _ = self.platform.visible() => {}
                }
                self.attempt = 0;
                return true;
            }

            if !self.platform.is_online() {
                self.enter_wait(RetryPlan::WhenOnline);
                debug!("offline; deferring reconnect until back online");
                tokio::select! {
                    _ = self.shutdown.cancelled() => return false,
                    _ = self.platform.online() => {}
                }
                return true;
            }

            if self.attempt >= self.config.max_attempts {
                let cooldown = self.config.cooldown;
                self.enter_wait(RetryPlan::Cooldown(cooldown));
                warn!(
                    attempts = self.attempt,
                    "reconnect attempts exhausted; cooling down for {:?}", cooldown
                );
                match self.pause_while_reachable(cooldown).await {
                    Wake::Elapsed => {
                        self.attempt = 0;
                        return true;
                    }
                    Wake::Cancelled => return false,
                    Wake::Interrupted => continue,
                }
            }

            self.attempt += 1;
            let delay = self.config.backoff.delay_for(self.attempt);
            self.enter_wait(RetryPlan::After(delay));
            debug!(attempt = self.attempt, "reconnecting in {:?}", delay);
            match self.pause_while_reachable(delay).await {
                Wake::Elapsed => return true,
                Wake::Cancelled => return false,
                Wake::Interrupted => {
                    // The timer never fired, so the attempt was not spent
                    self.attempt -= 1;
                    debug!("reachability changed during backoff; dropping the timer");
                }
            }
        }
    }

    fn enter_wait(&self, plan: RetryPlan) {
        let attempt = self.attempt;
        self.status.send_modify(|s| {
            s.state = ConnectionState::ReconnectWait;
            s.attempt = attempt;
            s.next_retry = Some(plan);
        });
    }

    /// Sleep unless cancelled first. Returns false on cancellation.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    /// Like [`pause`](Self::pause), but also ends early when the page is
    /// hidden or the device goes offline.
    async fn pause_while_reachable(&self, duration: Duration) -> Wake {
        tokio::select! {
            _ = self.shutdown.cancelled() => Wake::Cancelled,
            _ = tokio::time::sleep(duration) => Wake::Elapsed,
            _ = self.platform.hidden() => Wake::Interrupted,
            _ = self.platform.offline() => Wake::Interrupted,
        }
    }

    fn terminate(self) {
        self.status.send_modify(|s| {
            s.state = ConnectionState::Terminated;
            s.connected = false;
            s.next_retry = None;
        });
        info!("notification supervisor terminated");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use futures_util::future::BoxFuture;

    use super::*;
    use crate::backoff::ReconnectSchedule;
    use crate::transport::ABNORMAL_CLOSURE;

    struct FakeServer {
        events: mpsc::UnboundedSender<TransportEvent>,
        frames: mpsc::UnboundedReceiver<ClientFrame>,
    }

    struct Attempt {
        at: Instant,
        server: Option<FakeServer>,
    }

    struct FakeConnector {
        attempts: mpsc::UnboundedSender<Attempt>,
        refuse: AtomicBool,
        /// Handshakes never complete.
        hang: AtomicBool,
    }

    impl Connector for FakeConnector {
        fn connect(&self, _url: &str) -> BoxFuture<'static, Result<Connection, TransportError>> {
            let at = Instant::now();
            if self.hang.load(Ordering::SeqCst) {
                let _ = self.attempts.send(Attempt { at, server: None });
                return Box::pin(std::future::pending());
            }
            if self.refuse.load(Ordering::SeqCst) {
                let _ = self.attempts.send(Attempt { at, server: None });
                return Box::pin(async { Err(TransportError::Handshake("refused".into())) });
            }

            let (event_tx, event_rx) = mpsc::unbounded_channel();
            let (frame_tx, frame_rx) = mpsc::unbounded_channel();
            let _ = self.attempts.send(Attempt {
                at,
                server: Some(FakeServer {
                    events: event_tx,
                    frames: frame_rx,
                }),
            });
            Box::pin(async move {
                Ok(Connection {
                    outbound: frame_tx,
                    events: event_rx,
                })
            })
        }
    }

    struct Harness {
        handle: SupervisorHandle,
        connector: Arc<FakeConnector>,
        attempts: mpsc::UnboundedReceiver<Attempt>,
        notifications: mpsc::UnboundedReceiver<NotificationPayload>,
    }

    fn config() -> SupervisorConfig {
        let mut config = SupervisorConfig::new("ws://test/ws");
        config.initial_delay = Duration::from_millis(500);
        config.keepalive_interval = Duration::from_secs(25);
        config.backoff = ReconnectSchedule::new(
            [1, 2, 4].into_iter().map(Duration::from_secs).collect(),
        );
        config.max_attempts = 5;
        config.cooldown = Duration::from_secs(60);
        config
    }

    fn start(config: SupervisorConfig, platform: Platform, refuse: bool) -> Harness {
        let (attempt_tx, attempts) = mpsc::unbounded_channel();
        let connector = Arc::new(FakeConnector {
            attempts: attempt_tx,
            refuse: AtomicBool::new(refuse),
            hang: AtomicBool::new(false),
        });
        let (notify_tx, notifications) = mpsc::unbounded_channel();
        let handle = Supervisor::spawn(config, connector.clone(), platform, notify_tx);
        Harness {
            handle,
            connector,
            attempts,
            notifications,
        }
    }

    async fn wait_until(
        handle: &SupervisorHandle,
        ready: impl FnMut(&ConnectionStatus) -> bool,
    ) -> ConnectionStatus {
        let mut status = handle.status();
        status.wait_for(ready).await.unwrap().clone()
    }

    async fn wait_state(handle: &SupervisorHandle, state: ConnectionState) -> ConnectionStatus {
        wait_until(handle, |s| s.state == state).await
    }

    fn is_ping(frame: &ClientFrame) -> bool {
        match frame {
            ClientFrame::Text(text) => {
                matches!(WireMessage::decode(text), Ok(WireMessage::KeepalivePing(_)))
            }
            ClientFrame::Close(_) => false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_delays_follow_schedule_then_cool_down() {
        let started = Instant::now();
        let mut h = start(config(), Platform::always_available(), true);

        let mut times = Vec::new();
        for _ in 0..8 {
            times.push(h.attempts.recv().await.unwrap().at);
        }

        assert_eq!(times[0] - started, Duration::from_millis(500));
        let gaps: Vec<u64> = times.windows(2).map(|w| (w[1] - w[0]).as_secs()).collect();
        // attempts 1..5 escalate and hold, then one cooldown, then the schedule restarts
        assert_eq!(gaps, vec![1, 2, 4, 4, 4, 60, 1]);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn open_resets_attempts_and_pings_immediately() {
        let mut h = start(config(), Platform::always_available(), true);

        h.attempts.recv().await.unwrap();
        h.attempts.recv().await.unwrap();
        let waiting = wait_state(&h.handle, ConnectionState::ReconnectWait).await;
        assert_eq!(waiting.attempt, 2);
        assert!(waiting.last_error.is_some());

        h.connector.refuse.store(false, Ordering::SeqCst);
        let mut server = h.attempts.recv().await.unwrap().server.unwrap();

        let open = wait_state(&h.handle, ConnectionState::Open).await;
        assert!(open.connected);
        assert_eq!(open.attempt, 0);
        assert_eq!(open.last_error, None);

        let first = server.frames.recv().await.unwrap();
        assert!(is_ping(&first));

        // Unclean close: first scheduled wait uses the first delay again
        server
            .events
            .send(TransportEvent::Closed {
                code: ABNORMAL_CLOSURE,
                reason: String::new(),
            })
            .unwrap();
        let lost = wait_state(&h.handle, ConnectionState::ReconnectWait).await;
        assert_eq!(lost.attempt, 1);
        assert!(!lost.connected);
        assert_eq!(lost.next_retry, Some(RetryPlan::After(Duration::from_secs(1))));

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn keepalive_runs_on_its_period() {
        let mut h = start(config(), Platform::always_available(), false);
        let mut server = h.attempts.recv().await.unwrap().server.unwrap();

        let opened = Instant::now();
        assert!(is_ping(&server.frames.recv().await.unwrap()));
        for n in 1..=3u64 {
            assert!(is_ping(&server.frames.recv().await.unwrap()));
            assert_eq!(Instant::now() - opened, Duration::from_secs(25 * n));
        }

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn normal_close_does_not_reconnect() {
        let mut h = start(config(), Platform::always_available(), false);
        let server = h.attempts.recv().await.unwrap().server.unwrap();
        wait_state(&h.handle, ConnectionState::Open).await;

        server
            .events
            .send(TransportEvent::Closed {
                code: NORMAL_CLOSURE,
                reason: "bye".into(),
            })
            .unwrap();

        let idle = wait_state(&h.handle, ConnectionState::Idle).await;
        assert!(!idle.connected);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(h.attempts.try_recv().is_err());

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_page_defers_reconnect_until_visible() {
        let (controller, platform) = Platform::new();
        controller.set_visible(false);
        let mut h = start(config(), platform, true);

        h.attempts.recv().await.unwrap();
        let deferred = wait_state(&h.handle, ConnectionState::ReconnectWait).await;
        assert_eq!(deferred.next_retry, Some(RetryPlan::WhenVisible));

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(h.attempts.try_recv().is_err());

        let shown_at = Instant::now();
        controller.set_visible(true);
        let attempt = h.attempts.recv().await.unwrap();
        assert_eq!(attempt.at, shown_at);

        // Counter was reset, so the next timed wait starts at the first delay
        let waiting = wait_until(&h.handle, |s| {
            matches!(s.next_retry, Some(RetryPlan::After(_)))
        })
        .await;
        assert_eq!(waiting.attempt, 1);
        assert_eq!(waiting.next_retry, Some(RetryPlan::After(Duration::from_secs(1))));

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn hiding_during_backoff_drops_the_timer() {
        let (controller, platform) = Platform::new();
        let mut h = start(config(), platform, true);

        h.attempts.recv().await.unwrap();
        let timed = wait_state(&h.handle, ConnectionState::ReconnectWait).await;
        assert_eq!(timed.next_retry, Some(RetryPlan::After(Duration::from_secs(1))));

        controller.set_visible(false);
        let deferred = wait_until(&h.handle, |s| s.next_retry == Some(RetryPlan::WhenVisible)).await;
        assert_eq!(deferred.state, ConnectionState::ReconnectWait);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(h.attempts.try_recv().is_err());

        let shown_at = Instant::now();
        controller.set_visible(true);
        assert_eq!(h.attempts.recv().await.unwrap().at, shown_at);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn going_offline_during_backoff_keeps_the_attempt() {
        let (controller, platform) = Platform::new();
        let mut h = start(config(), platform, true);

        h.attempts.recv().await.unwrap();
        h.attempts.recv().await.unwrap();
        let timed = wait_until(&h.handle, |s| s.attempt == 2).await;
        assert_eq!(timed.next_retry, Some(RetryPlan::After(Duration::from_secs(2))));

        controller.set_online(false);
        let deferred = wait_until(&h.handle, |s| s.next_retry == Some(RetryPlan::WhenOnline)).await;
        assert_eq!(deferred.attempt, 1);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(h.attempts.try_recv().is_err());

        let online_at = Instant::now();
        controller.set_online(true);
        assert_eq!(h.attempts.recv().await.unwrap().at, online_at);

        // The interrupted wait is retried with the same delay
        let retry = wait_until(&h.handle, |s| {
            matches!(s.next_retry, Some(RetryPlan::After(_)))
        })
        .await;
        assert_eq!(retry.attempt, 2);
        assert_eq!(retry.next_retry, Some(RetryPlan::After(Duration::from_secs(2))));

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_handshake_times_out_into_backoff() {
        let started = Instant::now();
        let (attempt_tx, mut attempts) = mpsc::unbounded_channel();
        let connector = Arc::new(FakeConnector {
            attempts: attempt_tx,
            refuse: AtomicBool::new(false),
            hang: AtomicBool::new(true),
        });
        let (notify_tx, _notifications) = mpsc::unbounded_channel();
        let handle = Supervisor::spawn(config(), connector, Platform::always_available(), notify_tx);

        attempts.recv().await.unwrap();
        let waiting = wait_state(&handle, ConnectionState::ReconnectWait).await;
        assert_eq!(
            Instant::now() - started,
            Duration::from_millis(500) + Duration::from_secs(10)
        );
        assert_eq!(waiting.attempt, 1);
        assert!(!waiting.connected);
        assert!(waiting.last_error.unwrap().contains("timed out"));

        // The next handshake starts on schedule and can still be torn down
        let retried = attempts.recv().await.unwrap();
        assert_eq!(retried.at - started, Duration::from_millis(11_500));
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn offline_waits_for_online_without_spending_attempts() {
        let (controller, platform) = Platform::new();
        controller.set_online(false);
        let mut h = start(config(), platform, true);

        h.attempts.recv().await.unwrap();
        let deferred = wait_state(&h.handle, ConnectionState::ReconnectWait).await;
        assert_eq!(deferred.next_retry, Some(RetryPlan::WhenOnline));
        assert_eq!(deferred.attempt, 0);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(h.attempts.try_recv().is_err());

        let online_at = Instant::now();
        controller.set_online(true);
        assert_eq!(h.attempts.recv().await.unwrap().at, online_at);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_closes_transport_with_normal_code() {
        let mut h = start(config(), Platform::always_available(), false);
        let mut server = h.attempts.recv().await.unwrap().server.unwrap();
        wait_state(&h.handle, ConnectionState::Open).await;

        let mut status = h.handle.status();
        h.handle.shutdown().await;

        let mut frames = Vec::new();
        while let Some(frame) = server.frames.recv().await {
            frames.push(frame);
        }
        assert_eq!(frames.last(), Some(&ClientFrame::Close(NORMAL_CLOSURE)));
        assert_eq!(status.borrow_and_update().state, ConnectionState::Terminated);
        assert!(h.attempts.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_backoff_releases_timers() {
        let mut h = start(config(), Platform::always_available(), true);
        h.attempts.recv().await.unwrap();
        wait_state(&h.handle, ConnectionState::ReconnectWait).await;

        let status = h.handle.status();
        h.handle.shutdown().await;
        assert_eq!(status.borrow().state, ConnectionState::Terminated);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(h.attempts.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn only_notifications_are_forwarded() {
        let mut h = start(config(), Platform::always_available(), false);
        let server = h.attempts.recv().await.unwrap().server.unwrap();
        wait_state(&h.handle, ConnectionState::Open).await;

        let notification = r#"{"kind":"notification","data":{"type":"success","title":"Saved","message":"X","id":"srv-1","date":"2026-03-01T10:00:00Z","category":"student"}}"#;
        for text in [
            WireMessage::system("welcome").encode(),
            "garbage".to_string(),
            r#"{"kind":"presence","data":{}}"#.to_string(),
            WireMessage::keepalive_pong("pong").encode(),
            notification.to_string(),
        ] {
            server.events.send(TransportEvent::Text(text)).unwrap();
        }

        let payload = h.notifications.recv().await.unwrap();
        assert_eq!(payload.title, "Saved");
        assert!(h.notifications.try_recv().is_err());
        assert_eq!(h.handle.current().state, ConnectionState::Open);

        h.handle.shutdown().await;
    }
}
