use tokio::sync::mpsc;
use tracing::debug;

use beacon_types::NotificationPayload;

use crate::store::{Action, NewNotification, NotificationFeed};
use crate::toast::ToastScheduler;

/// The server's id and date are dropped; the store assigns its own on Add.
impl From<NotificationPayload> for NewNotification {
    fn from(payload: NotificationPayload) -> Self {
        Self {
            kind: payload.kind,
            title: payload.title,
            message: payload.message,
            category: payload.category,
            action_link: payload.action_link,
            action_text: payload.action_text,
        }
    }
}

/// Feed inbound notifications into the store, in arrival order, and offer
/// each one to the toast scheduler. Ends when the supervisor goes away.
pub async fn run_bridge(
    mut inbound: mpsc::UnboundedReceiver<NotificationPayload>,
    feed: NotificationFeed,
    toasts: ToastScheduler,
) {
    while let Some(payload) = inbound.recv().await {
        let notification = NewNotification::from(payload).into_notification();
        let unread = feed.dispatch(Action::Add(notification.clone()));
        debug!(id = %notification.id, kind = %notification.kind, unread, "notification received");
        toasts.offer(&notification);
    }
    debug!("notification bridge stopped");
}
