use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use uuid::Uuid;

use beacon_types::{Category, Notification, NotificationKind};

/// Fields supplied by whoever raises a notification. Identity, timestamp and
/// read state are assigned when it enters the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub category: Option<Category>,
    pub action_link: Option<String>,
    pub action_text: Option<String>,
}

impl NewNotification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            category: None,
            action_link: None,
            action_text: None,
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn into_notification(self) -> Notification {
        Notification {
            id: Uuid::new_v4().to_string(),
            kind: self.kind,
            title: self.title,
            message: self.message,
            category: self.category,
            action_link: self.action_link,
            action_text: self.action_text,
            timestamp: Utc::now(),
            read: false,
        }
    }
}

/// The only ways the notification list changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Add(Notification),
    Remove(String),
    ClearAll,
    MarkRead(String),
    MarkAllRead,
}

impl Action {
    pub fn add(notification: NewNotification) -> Self {
        Action::Add(notification.into_notification())
    }
}

/// Apply one action. Only `Add` changes order, by prepending; an `Add` whose
/// id is already present is ignored.
pub fn reduce(mut list: Vec<Notification>, action: Action) -> Vec<Notification> {
    match action {
        Action::Add(mut notification) => {
            if list.iter().any(|n| n.id == notification.id) {
                return list;
            }
            notification.read = false;
            list.insert(0, notification);
        }
        Action::Remove(id) => list.retain(|n| n.id != id),
        Action::ClearAll => list.clear(),
        Action::MarkRead(id) => {
            if let Some(n) = list.iter_mut().find(|n| n.id == id) {
                n.read = true;
            }
        }
        Action::MarkAllRead => list.iter_mut().for_each(|n| n.read = true),
    }
    list
}

pub fn unread_count(list: &[Notification]) -> usize {
    list.iter().filter(|n| !n.read).count()
}

/// Partition of a list by local calendar day. Each group keeps the list's
/// relative order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecencyGroups {
    pub today: Vec<Notification>,
    pub yesterday: Vec<Notification>,
    pub this_week: Vec<Notification>,
    pub older: Vec<Notification>,
}

impl RecencyGroups {
    pub fn len(&self) -> usize {
        self.today.len() + self.yesterday.len() + self.this_week.len() + self.older.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group by how many calendar days (in `now`'s time zone) separate each entry
/// from `now`. Timestamps in the future count as today.
pub fn group_by_recency<Tz: TimeZone>(list: &[Notification], now: &DateTime<Tz>) -> RecencyGroups {
    let zone = now.timezone();
    let today = now.date_naive();
    let mut groups = RecencyGroups::default();

    for n in list {
        let day = n.timestamp.with_timezone(&zone).date_naive();
        let bucket = match (today - day).num_days() {
            ..=0 => &mut groups.today,
            1 => &mut groups.yesterday,
            2..=6 => &mut groups.this_week,
            _ => &mut groups.older,
        };
        bucket.push(n.clone());
    }

    groups
}

/// Shared handle to the client's notification list.
///
/// Every change goes through [`dispatch`](Self::dispatch), which applies
/// [`reduce`] under the lock and then publishes the new unread count.
#[derive(Clone)]
pub struct NotificationFeed {
    list: Arc<Mutex<Vec<Notification>>>,
    unread: Arc<watch::Sender<usize>>,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationFeed {
    pub fn new() -> Self {
        let (unread, _) = watch::channel(0);
        Self {
            list: Arc::new(Mutex::new(Vec::new())),
            unread: Arc::new(unread),
        }
    }

    /// Returns the unread count after the action.
    pub fn dispatch(&self, action: Action) -> usize {
        let mut list = self.list.lock();
        let current = std::mem::take(&mut *list);
        *list = reduce(current, action);

        let unread = unread_count(&list);
        // Still under the lock, so published counts follow dispatch order
        self.unread.send_replace(unread);
        unread
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.list.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        self.list.lock().iter().find(|n| n.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.list.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn unread_count(&self) -> usize {
        unread_count(&self.list.lock())
    }

    pub fn subscribe_unread(&self) -> watch::Receiver<usize> {
        self.unread.subscribe()
    }

    pub fn grouped(&self) -> RecencyGroups {
        self.grouped_at(&Local::now())
    }

    pub fn grouped_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> RecencyGroups {
        group_by_recency(&self.list.lock(), now)
    }
}
