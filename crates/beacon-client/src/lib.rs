//! Client side of the notification socket.
//!
//! [`Supervisor`] keeps one logical connection alive across drops, the
//! [`bridge`] turns inbound wire notifications into store entries, the
//! [`NotificationFeed`] holds them, and the [`ToastScheduler`] shows the
//! newest few for a short while. [`NotificationClient`] wires all of it.

pub mod backoff;
pub mod bridge;
pub mod client;
pub mod config;
pub mod platform;
pub mod store;
pub mod supervisor;
pub mod toast;
pub mod transport;

pub use backoff::ReconnectSchedule;
pub use client::NotificationClient;
pub use config::{ClientConfig, SupervisorConfig};
pub use platform::{Platform, PlatformController};
pub use store::{Action, NewNotification, NotificationFeed, RecencyGroups};
pub use supervisor::{ConnectionState, ConnectionStatus, RetryPlan, Supervisor, SupervisorHandle};
pub use toast::ToastScheduler;
pub use transport::{ClientFrame, Connection, Connector, TransportError, TransportEvent, WsConnector};
