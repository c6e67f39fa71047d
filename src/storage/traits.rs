//! Storage traits and error types
//!
//! This module defines the trait interface for extraction record stores and
//! associated error types.

use crate::storage::{PageRecord, RetryEntry};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed record {path}: {message}")]
    MalformedRecord { path: String, message: String },

    #[error("Could not allocate a unique record name in {0}")]
    NameExhausted(String),
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for extraction record stores
///
/// A store holds the extracted [`PageRecord`]s plus the retry list of titles
/// whose extraction failed transiently. The retry list is never part of the
/// ledger: a title in the retry list is still pending.
pub trait RecordStore {
    // ===== Ledger =====

    /// Returns every title that currently has a persisted record
    ///
    /// Recomputed from what is persisted on every call.
    fn extracted_titles(&self) -> StorageResult<HashSet<String>>;

    /// Returns the number of persisted records
    fn record_count(&self) -> StorageResult<u64>;

    // ===== Records =====

    /// Persists a record without overwriting any existing one
    fn write_record(&mut self, record: &PageRecord) -> StorageResult<()>;

    // ===== Retry list =====

    /// Adds a title to the retry list, or bumps its attempt counter
    fn record_retry(&mut self, title: &str, reason: &str) -> StorageResult<()>;

    /// Removes a title from the retry list; no-op when absent
    fn clear_retry(&mut self, title: &str) -> StorageResult<()>;

    /// Returns the retry list in insertion order
    fn retry_entries(&self) -> StorageResult<Vec<RetryEntry>>;
}
