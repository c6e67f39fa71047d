//! Database schema definitions
//!
//! This module contains the SQL schema for the SQLite manifest store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per extracted page; the title is the ledger key
CREATE TABLE IF NOT EXISTS pages (
    title TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    extracted_at TEXT NOT NULL
);

-- Titles whose fetch failed and should be retried
CREATE TABLE IF NOT EXISTS retry_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL UNIQUE,
    reason TEXT NOT NULL,
    attempts INTEGER NOT NULL DEFAULT 1,
    last_attempt_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
