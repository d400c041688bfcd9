//! Row types as stored in SQLite, kept separate from the beacon-types models.

pub struct ActivityRow {
    pub id: String,
    pub category: String,
    pub title: String,
    pub message: String,
    /// RFC 3339, UTC.
    pub created_at: String,
}
