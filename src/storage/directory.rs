//! Directory record store
//!
//! Every record is a JSON object `{title: content}` in its own file, named by
//! 64 random alphanumeric characters. The file name is never used as a
//! lookup key: the ledger is rebuilt by reading every record's embedded
//! title. Records are written through a temp file in the same directory and
//! linked into place without clobbering, so concurrent runs cannot corrupt
//! each other's output.

use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::{PageRecord, RetryEntry};
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Length of the random part of a record file name
pub const RECORD_NAME_LEN: usize = 64;

/// Extension every record file carries
pub const RECORD_EXTENSION: &str = "json";

const MAX_NAME_ATTEMPTS: usize = 8;

/// Flat-file record store
pub struct DirectoryStore {
    dir: PathBuf,
    retry_path: PathBuf,
}

impl DirectoryStore {
    /// Opens the store, creating the record directory when missing
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory holding the record files
    /// * `retry_path` - JSON file holding the retry list (outside `dir`)
    pub fn new(dir: &Path, retry_path: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            retry_path: retry_path.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists the record files currently in the directory
    pub fn record_paths(&self) -> StorageResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StorageError::io(&self.dir, e))?.path();
            if path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(RECORD_EXTENSION)
            {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Reads one record file
    pub fn read_record(path: &Path) -> StorageResult<PageRecord> {
        let content = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        let value: serde_json::Value = serde_json::from_str(&content)?;

        PageRecord::from_json(&value).ok_or_else(|| StorageError::MalformedRecord {
            path: path.display().to_string(),
            message: "expected an object mapping a title to a string".to_string(),
        })
    }

    fn load_retry_list(&self) -> StorageResult<Vec<RetryEntry>> {
        match fs::read_to_string(&self.retry_path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StorageError::io(&self.retry_path, e)),
        }
    }

    fn save_retry_list(&self, entries: &[RetryEntry]) -> StorageResult<()> {
        let parent = match self.retry_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| StorageError::io(&parent, e))?;

        let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| StorageError::io(&parent, e))?;
        serde_json::to_writer_pretty(&mut tmp, entries)?;
        tmp.flush().map_err(|e| StorageError::io(tmp.path(), e))?;
        tmp.persist(&self.retry_path)
            .map_err(|e| StorageError::io(&self.retry_path, e.error))?;
        Ok(())
    }
}

/// Generates a random record file name
pub fn random_record_name() -> String {
    let stem: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RECORD_NAME_LEN)
        .map(char::from)
        .collect();
    format!("{}.{}", stem, RECORD_EXTENSION)
}

impl RecordStore for DirectoryStore {
    fn extracted_titles(&self) -> StorageResult<HashSet<String>> {
        let mut titles = HashSet::new();

        for path in self.record_paths()? {
            match Self::read_record(&path) {
                Ok(record) => {
                    titles.insert(record.title);
                }
                Err(e) => {
                    // Unreadable records do not count; their title is fetched again.
                    tracing::warn!("Skipping unreadable record {}: {}", path.display(), e);
                }
            }
        }

        Ok(titles)
    }

    fn record_count(&self) -> StorageResult<u64> {
        Ok(self.record_paths()?.len() as u64)
    }

    fn write_record(&mut self, record: &PageRecord) -> StorageResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        serde_json::to_writer(&mut tmp, &record.to_json())?;
        tmp.flush().map_err(|e| StorageError::io(tmp.path(), e))?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(random_record_name());
            match tmp.persist_noclobber(&path) {
                Ok(_) => {
                    tracing::debug!("Wrote '{}' to {}", record.title, path.display());
                    return Ok(());
                }
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    tmp = e.file;
                }
                Err(e) => return Err(StorageError::io(&path, e.error)),
            }
        }

        Err(StorageError::NameExhausted(self.dir.display().to_string()))
    }

    fn record_retry(&mut self, title: &str, reason: &str) -> StorageResult<()> {
        let mut entries = self.load_retry_list()?;
        let now = Utc::now().to_rfc3339();

        match entries.iter_mut().find(|entry| entry.title == title) {
            Some(entry) => {
                entry.reason = reason.to_string();
                entry.attempts += 1;
                entry.last_attempt_at = now;
            }
            None => entries.push(RetryEntry {
                title: title.to_string(),
                reason: reason.to_string(),
                attempts: 1,
                last_attempt_at: now,
            }),
        }

        self.save_retry_list(&entries)
    }

    fn clear_retry(&mut self, title: &str) -> StorageResult<()> {
        let mut entries = self.load_retry_list()?;
        let before = entries.len();
        entries.retain(|entry| entry.title != title);

        if entries.len() != before {
            self.save_retry_list(&entries)?;
        }
        Ok(())
    }

    fn retry_entries(&self) -> StorageResult<Vec<RetryEntry>> {
        self.load_retry_list()
    }
}
