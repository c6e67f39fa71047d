//! Storage module for extracted page records
//!
//! This module handles persistence for the extraction pipeline, including:
//! - The directory store: one randomly named JSON file per record
//! - The SQLite manifest store: one indexed table keyed by title
//! - The retry list of titles whose fetch failed transiently

mod directory;
mod schema;
mod sqlite;
mod traits;

pub use directory::DirectoryStore;
pub use sqlite::SqliteStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use crate::config::{ExtractionConfig, StoreKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opens the store selected by the extraction configuration
///
/// # Arguments
///
/// * `config` - The extraction configuration
///
/// # Returns
///
/// * `Ok(Box<dyn RecordStore>)` - The opened store
/// * `Err(StorageError)` - Failed to create the directory or open the database
pub fn open_store(config: &ExtractionConfig) -> StorageResult<Box<dyn RecordStore>> {
    match (config.store, &config.database_path) {
        (StoreKind::Sqlite, Some(path)) => Ok(Box::new(SqliteStore::new(path)?)),
        _ => Ok(Box::new(DirectoryStore::new(
            &config.output_dir,
            &config.retry_path(),
        )?)),
    }
}

/// One extracted wiki page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub title: String,
    pub content: String,
}

impl PageRecord {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// JSON form: an object with the title as its only key
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.title.clone(), Value::String(self.content.clone()));
        Value::Object(map)
    }

    /// Reads the JSON form back; the first key is the title
    pub fn from_json(value: &Value) -> Option<Self> {
        let (title, content) = value.as_object()?.iter().next()?;
        Some(Self::new(title.clone(), content.as_str()?))
    }
}

/// A title whose extraction must be retried by a later run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryEntry {
    pub title: String,
    pub reason: String,
    pub attempts: u32,
    /// RFC 3339 timestamp of the latest failed attempt
    pub last_attempt_at: String,
}
