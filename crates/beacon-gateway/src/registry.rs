use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// Instructions for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// An encoded wire message.
    Text(String),
    /// Transport-level liveness probe (WebSocket Ping frame).
    Probe,
    /// Close the transport immediately.
    Terminate,
}

struct ConnectionEntry {
    /// Cleared by every sweep, set again by the pong handler.
    alive: bool,
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ConnectionEntry {
    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Handles given to a freshly accepted connection.
pub struct Registration {
    pub id: ConnectionId,
    /// Lets the connection's reader queue replies through its own writer.
    pub sender: mpsc::UnboundedSender<Outbound>,
    pub receiver: mpsc::UnboundedReceiver<Outbound>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub probed: usize,
    pub evicted: usize,
    pub skipped: usize,
}

/// Owns the set of live connections.
///
/// Clones share the same set. Every operation takes the lock for one
/// synchronous step and never awaits while holding it, so inserts, removals,
/// sweeps and broadcasts never interleave mid-step.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    connections: RwLock<HashMap<ConnectionId, ConnectionEntry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a connection: fresh identity, marked alive.
    pub fn register(&self) -> Registration {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.connections.write().insert(
            id,
            ConnectionEntry {
                alive: true,
                tx: tx.clone(),
            },
        );
        debug!(%id, "connection registered");
        Registration {
            id,
            sender: tx,
            receiver: rx,
        }
    }

    /// Drop bookkeeping for a closed connection. Idempotent.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.inner.connections.write().remove(&id).is_some();
        if removed {
            debug!(%id, "connection unregistered");
        }
        removed
    }

    /// Pong handler: the peer answered the last probe.
    pub fn mark_alive(&self, id: ConnectionId) {
        if let Some(entry) = self.inner.connections.write().get_mut(&id) {
            entry.alive = true;
        }
    }

    pub fn is_alive(&self, id: ConnectionId) -> Option<bool> {
        self.inner.connections.read().get(&id).map(|e| e.alive)
    }

    pub fn len(&self) -> usize {
        self.inner.connections.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.inner.connections.read().keys().copied().collect()
    }

    /// Queue `text` on every open connection. A connection whose writer has
    /// gone away is skipped; the sweep or its close handler reclaims it.
    /// Returns how many connections accepted the write.
    pub fn broadcast_text(&self, text: &str) -> usize {
        let connections = self.inner.connections.read();
        let mut delivered = 0;

        for (id, entry) in connections.iter() {
            if !entry.is_open() {
                continue;
            }
            match entry.tx.send(Outbound::Text(text.to_owned())) {
                Ok(()) => delivered += 1,
                Err(_) => warn!(%id, "write to connection failed, skipping"),
            }
        }

        delivered
    }

    /// Terminate and forget every connection (server shutdown).
    pub fn terminate_all(&self) -> usize {
        let mut connections = self.inner.connections.write();
        let count = connections.len();
        for (_, entry) in connections.drain() {
            let _ = entry.tx.send(Outbound::Terminate);
        }
        count
    }

    /// One liveness pass.
    ///
    /// A connection that did not answer the previous probe is terminated and
    /// removed; every other open connection is marked not-alive and probed.
    /// Connections whose transport is already closed are left for their own
    /// close handler.
    pub fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let mut connections = self.inner.connections.write();

        connections.retain(|id, entry| {
            if !entry.is_open() {
                report.skipped += 1;
                return true;
            }

            if !entry.alive {
                warn!(%id, "connection missed liveness probe, terminating");
                let _ = entry.tx.send(Outbound::Terminate);
                report.evicted += 1;
                return false;
            }

            entry.alive = false;
            if entry.tx.send(Outbound::Probe).is_ok() {
                report.probed += 1;
            } else {
                report.skipped += 1;
            }
            true
        });

        report
    }

    /// Run [`sweep`](Self::sweep) every `period` until `shutdown` fires.
    pub fn spawn_sweeper(&self, period: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let report = registry.sweep();
                        if report.evicted > 0 {
                            info!(
                                evicted = report.evicted,
                                remaining = registry.len(),
                                "liveness sweep evicted dead connections"
                            );
                        } else {
                            debug!(probed = report.probed, skipped = report.skipped, "liveness sweep");
                        }
                    }
                }
            }

            debug!("liveness sweeper stopped");
        })
    }
}
