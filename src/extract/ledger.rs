//! Resume ledger
//!
//! The ledger is the set of titles that already have a persisted record. It
//! is rebuilt from the store at the start of every run and never written
//! anywhere on its own.

use crate::storage::{RecordStore, StorageResult};
use std::collections::HashSet;

/// Titles already extracted
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    titles: HashSet<String>,
}

impl Ledger {
    /// Rebuilds the ledger from what the store currently holds
    pub fn load(store: &dyn RecordStore) -> StorageResult<Self> {
        let titles = store.extracted_titles()?;
        tracing::debug!("Ledger holds {} extracted titles", titles.len());
        Ok(Self { titles })
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    /// Marks a title written during the current run
    pub fn insert(&mut self, title: &str) {
        self.titles.insert(title.to_string());
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Filters a title queue down to the titles not yet extracted
    pub fn pending<'a>(&self, all_titles: &'a [String]) -> Vec<&'a str> {
        all_titles
            .iter()
            .map(String::as_str)
            .filter(|title| !self.contains(title))
            .collect()
    }
}

/// Returns `all_titles` minus every title with a persisted record, in order
///
/// # Arguments
///
/// * `all_titles` - The title queue
/// * `store` - The record store to scan
pub fn pending_titles(all_titles: &[String], store: &dyn RecordStore) -> StorageResult<Vec<String>> {
    let ledger = Ledger::load(store)?;
    Ok(ledger
        .pending(all_titles)
        .into_iter()
        .map(str::to_string)
        .collect())
}
