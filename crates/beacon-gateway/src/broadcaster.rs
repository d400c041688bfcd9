use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use beacon_db::Database;
use beacon_types::api::NotifyRequest;
use beacon_types::{Category, NotificationKind, NotificationPayload, WireMessage};

use crate::registry::ConnectionRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub category: Category,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Durable, append-only sink for the activity feed.
pub trait ActivityLog: Send + Sync + 'static {
    fn append(&self, entry: &ActivityEntry) -> anyhow::Result<()>;
}

impl ActivityLog for Database {
    fn append(&self, entry: &ActivityEntry) -> anyhow::Result<()> {
        self.record_activity(entry.category, &entry.title, &entry.message, entry.created_at)
            .map(|_| ())
    }
}

/// Turns domain events into notifications and fans them out to every
/// registered connection.
#[derive(Clone)]
pub struct Notifier {
    registry: ConnectionRegistry,
    activity: Option<Arc<dyn ActivityLog>>,
}

impl Notifier {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self {
            registry,
            activity: None,
        }
    }

    pub fn with_activity_log(mut self, log: Arc<dyn ActivityLog>) -> Self {
        self.activity = Some(log);
        self
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Broadcast a notification. Never fails and never waits on I/O.
    ///
    /// The returned count is how many connections had the message queued. It
    /// is diagnostic only: a queued write can still be lost if the peer is
    /// already gone.
    pub fn notify(&self, request: NotifyRequest) -> usize {
        let payload = NotificationPayload {
            kind: request.kind,
            title: request.title,
            message: request.message,
            id: Uuid::new_v4().to_string(),
            date: Utc::now(),
            category: request.category,
            action_link: request.action_link,
            action_text: request.action_text,
        };

        let text = WireMessage::Notification(payload.clone()).encode();
        let delivered = self.registry.broadcast_text(&text);

        info!(
            id = %payload.id,
            kind = %payload.kind,
            delivered,
            "notification broadcast"
        );

        self.record_activity(&payload);
        delivered
    }

    pub fn notify_simple(
        &self,
        kind: NotificationKind,
        title: &str,
        message: &str,
        category: Option<Category>,
    ) -> usize {
        let mut request = NotifyRequest::new(kind, title, message);
        request.category = category;
        self.notify(request)
    }

    /// Fire-and-forget append on the blocking pool; a failure here never
    /// unwinds the broadcast. Called outside a runtime, the entry is dropped.
    fn record_activity(&self, payload: &NotificationPayload) {
        let Some(log) = self.activity.clone() else {
            return;
        };
        let Some(category) = payload.category else {
            return;
        };
        if payload.title.trim().is_empty() || payload.message.trim().is_empty() {
            return;
        }

        let entry = ActivityEntry {
            category,
            title: payload.title.clone(),
            message: payload.message.clone(),
            created_at: payload.date,
        };

        let skipped_title = entry.title.clone();
        let write = move || match log.append(&entry) {
            Ok(()) => debug!(category = %entry.category, "activity recorded"),
            Err(e) => warn!("Failed to record activity for '{}': {}", entry.title, e),
        };

        // SQLite writes block; the entry needs a blocking pool or it is skipped
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(write);
            }
            Err(_) => warn!(
                title = %skipped_title,
                "no runtime for the activity write; entry skipped"
            ),
        }
    }
}
