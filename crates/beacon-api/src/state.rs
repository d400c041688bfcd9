use std::sync::Arc;

use beacon_db::Database;
use beacon_gateway::{ConnectionRegistry, Notifier};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub notifier: Notifier,
}

impl AppStateInner {
    /// Wire a notifier over `registry` that records activity into `db`.
    pub fn new(db: Arc<Database>, registry: ConnectionRegistry) -> Self {
        let notifier = Notifier::new(registry).with_activity_log(db.clone());
        Self { db, notifier }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        self.notifier.registry()
    }
}
