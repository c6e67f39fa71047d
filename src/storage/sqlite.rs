//! SQLite manifest store
//!
//! Keeps every extracted page in one indexed table so "already extracted"
//! checks do not need to read every record.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageResult};
use crate::storage::{PageRecord, RetryEntry};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::Path;

/// SQLite-backed record store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the manifest database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Returns whether a record exists for the title
    pub fn contains(&self, title: &str) -> StorageResult<bool> {
        let found: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM pages WHERE title = ?1)",
            params![title],
            |row| row.get(0),
        )?;
        Ok(found != 0)
    }

    /// Returns the stored content for a title
    pub fn content(&self, title: &str) -> StorageResult<Option<String>> {
        use rusqlite::OptionalExtension;

        let content = self
            .conn
            .query_row(
                "SELECT content FROM pages WHERE title = ?1",
                params![title],
                |row| row.get(0),
            )
            .optional()?;
        Ok(content)
    }
}

impl RecordStore for SqliteStore {
    fn extracted_titles(&self) -> StorageResult<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT title FROM pages")?;
        let titles = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(titles)
    }

    fn record_count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn write_record(&mut self, record: &PageRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT INTO pages (title, content, extracted_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(title) DO NOTHING",
            params![record.title, record.content, now],
        )?;

        if inserted == 0 {
            tracing::debug!("Record for '{}' already stored, keeping it", record.title);
        }
        Ok(())
    }

    fn record_retry(&mut self, title: &str, reason: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO retry_queue (title, reason, attempts, last_attempt_at)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(title) DO UPDATE SET
                reason = excluded.reason,
                attempts = attempts + 1,
                last_attempt_at = excluded.last_attempt_at",
            params![title, reason, now],
        )?;
        Ok(())
    }

    fn clear_retry(&mut self, title: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM retry_queue WHERE title = ?1", params![title])?;
        Ok(())
    }

    fn retry_entries(&self) -> StorageResult<Vec<RetryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, reason, attempts, last_attempt_at FROM retry_queue ORDER BY id",
        )?;

        let entries = stmt
            .query_map([], |row| {
                Ok(RetryEntry {
                    title: row.get(0)?,
                    reason: row.get(1)?,
                    attempts: row.get(2)?,
                    last_attempt_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
