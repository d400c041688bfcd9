use crate::Database;
use crate::models::ActivityRow;
use anyhow::Result;
use beacon_types::Category;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use uuid::Uuid;

impl Database {
    // -- Activity log --

    /// Append one entry. Returns the generated row id.
    pub fn record_activity(
        &self,
        category: Category,
        title: &str,
        message: &str,
        at: DateTime<Utc>,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        // Fixed-width timestamps keep lexical order equal to time order.
        let created_at = at.to_rfc3339_opts(SecondsFormat::Micros, true);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO activity_log (id, category, title, message, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, category.as_str(), title, message, created_at],
            )?;
            Ok(())
        })?;

        Ok(id)
    }

    /// Newest entries first.
    pub fn recent_activity(&self, limit: u32) -> Result<Vec<ActivityRow>> {
        self.with_conn(|conn| query_recent_activity(conn, limit))
    }
}

fn query_recent_activity(conn: &Connection, limit: u32) -> Result<Vec<ActivityRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, category, title, message, created_at
         FROM activity_log
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?1",
    )?;

    let rows = stmt
        .query_map([limit], |row| {
            Ok(ActivityRow {
                id: row.get(0)?,
                category: row.get(1)?,
                title: row.get(2)?,
                message: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
