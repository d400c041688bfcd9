use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Category, NotificationKind};

// -- Notify --

/// A domain event to broadcast. Field names follow the wire payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NotifyRequest {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
}

impl NotifyRequest {
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

    pub fn action(mut self, link: impl Into<String>, text: impl Into<String>) -> Self {
        self.action_link = Some(link.into());
        self.action_text = Some(text.into());
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotifyResponse {
    /// Connections the message was queued on. Not a delivery guarantee.
    pub delivered: usize,
}

// -- Activity --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: String,
    pub category: Category,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// -- Health --

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub connections: usize,
}
