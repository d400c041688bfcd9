use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use beacon_types::Notification;

use crate::store::{Action, NotificationFeed};

pub const MAX_VISIBLE_TOASTS: usize = 3;
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

struct ActiveToast {
    notification: Notification,
    timer: JoinHandle<()>,
}

struct ToastInner {
    feed: NotificationFeed,
    duration: Duration,
    /// Newest first, never longer than `MAX_VISIBLE_TOASTS`.
    active: Mutex<Vec<ActiveToast>>,
}

impl Drop for ToastInner {
    fn drop(&mut self) {
        for toast in self.active.get_mut().drain(..) {
            toast.timer.abort();
        }
    }
}

/// Short-lived presentation of the newest unread notifications.
///
/// Each toast owns its expiry task. Expiry, dismissal and activation all
/// mark the notification read and cancel that task; dropping a toast because
/// newer ones pushed it out only cancels the task.
#[derive(Clone)]
pub struct ToastScheduler {
    inner: Arc<ToastInner>,
}

impl ToastScheduler {
    pub fn new(feed: NotificationFeed, duration: Duration) -> Self {
        Self {
            inner: Arc::new(ToastInner {
                feed,
                duration,
                active: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Show `notification` if it is unread and not already on screen.
    /// Must be called from within a Tokio runtime.
    pub fn offer(&self, notification: &Notification) -> bool {
        if notification.read {
            return false;
        }

        let mut active = self.inner.active.lock();
        if active.iter().any(|t| t.notification.id == notification.id) {
            return false;
        }

        let timer = self.spawn_expiry(notification.id.clone());
        active.insert(
            0,
            ActiveToast {
                notification: notification.clone(),
                timer,
            },
        );

        while active.len() > MAX_VISIBLE_TOASTS {
            if let Some(dropped) = active.pop() {
                debug!(id = %dropped.notification.id, "toast pushed out by newer ones");
                dropped.timer.abort();
            }
        }
        true
    }

    fn spawn_expiry(&self, id: String) -> JoinHandle<()> {
        let scheduler: Weak<ToastInner> = Arc::downgrade(&self.inner);
        let duration = self.inner.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = scheduler.upgrade() {
                ToastScheduler { inner }.retire(&id);
            }
        })
    }

    /// Remove a toast and mark it read. An id that is no longer shown is a
    /// no-op, so a late timer cannot process a toast twice.
    fn retire(&self, id: &str) -> Option<Notification> {
        let toast = {
            let mut active = self.inner.active.lock();
            let index = active.iter().position(|t| t.notification.id == id)?;
            active.remove(index)
        };
        toast.timer.abort();
        self.inner.feed.dispatch(Action::MarkRead(id.to_string()));
        Some(toast.notification)
    }

    pub fn dismiss(&self, id: &str) -> bool {
        self.retire(id).is_some()
    }

    /// The toast was clicked. Returns its action link, if any.
    pub fn activate(&self, id: &str) -> Option<String> {
        self.retire(id).and_then(|n| n.action_link)
    }

    pub fn visible(&self) -> Vec<Notification> {
        self.inner
            .active
            .lock()
            .iter()
            .map(|t| t.notification.clone())
            .collect()
    }

    /// Cancel every expiry task without touching the store.
    pub fn shutdown(&self) {
        let mut active = self.inner.active.lock();
        for toast in active.drain(..) {
            toast.timer.abort();
        }
    }
}
