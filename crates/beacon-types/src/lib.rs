pub mod api;
pub mod events;
pub mod models;

pub use events::{
    KeepalivePayload, NotificationPayload, SystemPayload, WireError, WireMessage,
};
pub use models::{Category, Notification, NotificationKind};
