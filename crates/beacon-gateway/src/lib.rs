pub mod broadcaster;
pub mod connection;
pub mod registry;

pub use beacon_types::api::NotifyRequest;
pub use broadcaster::{ActivityEntry, ActivityLog, Notifier};
pub use registry::{ConnectionId, ConnectionRegistry, Outbound, Registration, SweepReport};
