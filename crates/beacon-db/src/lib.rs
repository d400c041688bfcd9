pub mod migrations;
pub mod models;
pub mod queries;

use std::path::Path;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::info;

/// Append-only store for the activity log written alongside broadcasts.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// File-backed log in WAL mode, so feed readers never block the writer.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("opening activity log at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::with_schema(conn)?;
        info!(path = %path.display(), "activity log ready");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_schema(Connection::open_in_memory()?)
    }

    fn with_schema(conn: Connection) -> Result<Self> {
        migrations::run(&conn).context("migrating activity log schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        f(&self.conn.lock())
    }
}
