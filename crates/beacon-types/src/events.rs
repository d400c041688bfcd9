use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Category, NotificationKind};

/// Message kinds understood by this version of the protocol.
pub const KNOWN_KINDS: [&str; 4] = ["keepalive-ping", "keepalive-pong", "system", "notification"];

/// Envelope exchanged over the notification socket in both directions.
///
/// Serialized as `{"kind": "...", "data": {...}}`. There is no sequencing or
/// acknowledgement: a client that is not connected when a notification is
/// broadcast never sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum WireMessage {
    /// Client keepalive. Only its arrival matters.
    KeepalivePing(KeepalivePayload),

    /// Server reply to a keepalive ping.
    KeepalivePong(KeepalivePayload),

    /// One-shot informational message (e.g. the welcome). Never stored.
    System(SystemPayload),

    /// A broadcast notification.
    Notification(NotificationPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeepalivePayload {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemPayload {
    pub message: String,
    pub date: DateTime<Utc>,
}

/// Notification as broadcast by the server. Carries no `read` flag; the
/// receiving client assigns its own id and read state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub id: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("message has no kind")]
    MissingKind,

    #[error("unknown message kind '{0}'")]
    UnknownKind(String),
}

impl WireMessage {
    pub fn keepalive_ping(message: impl Into<String>) -> Self {
        Self::KeepalivePing(KeepalivePayload {
            message: message.into(),
            timestamp: Utc::now(),
        })
    }

    pub fn keepalive_pong(message: impl Into<String>) -> Self {
        Self::KeepalivePong(KeepalivePayload {
            message: message.into(),
            timestamp: Utc::now(),
        })
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::System(SystemPayload {
            message: message.into(),
            date: Utc::now(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeepalivePing(_) => "keepalive-ping",
            Self::KeepalivePong(_) => "keepalive-pong",
            Self::System(_) => "system",
            Self::Notification(_) => "notification",
        }
    }

    pub fn encode(&self) -> String {
        // Every variant is plain data with string keys, so this cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a text frame. Kinds this build does not know about are reported
    /// separately so callers can drop them without treating them as corrupt.
    pub fn decode(text: &str) -> Result<Self, WireError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let kind = value
            .get("kind")
            .and_then(|k| k.as_str())
            .ok_or(WireError::MissingKind)?;

        if !KNOWN_KINDS.contains(&kind) {
            return Err(WireError::UnknownKind(kind.to_string()));
        }

        Ok(serde_json::from_value(value)?)
    }
}
