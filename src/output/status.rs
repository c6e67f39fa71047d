//! Extraction status report
//!
//! Summarizes the title queue against what the store already holds.

use crate::extract::Ledger;
use crate::storage::{RecordStore, RetryEntry, StorageResult};

/// Snapshot of extraction progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionStatus {
    /// Titles in the queue
    pub queued: usize,

    /// Records in the store, including titles no longer queued
    pub extracted: u64,

    /// Queued titles without a record
    pub pending: usize,

    /// The retry list
    pub retrying: Vec<RetryEntry>,
}

impl ExtractionStatus {
    /// Share of queued titles that have a record, as a percentage
    pub fn completion(&self) -> f64 {
        if self.queued == 0 {
            return 100.0;
        }
        (self.queued - self.pending) as f64 / self.queued as f64 * 100.0
    }
}

/// Loads the extraction status
///
/// # Arguments
///
/// * `titles` - The title queue
/// * `store` - The record store to inspect
pub fn load_status(titles: &[String], store: &dyn RecordStore) -> StorageResult<ExtractionStatus> {
    let ledger = Ledger::load(store)?;

    Ok(ExtractionStatus {
        queued: titles.len(),
        extracted: store.record_count()?,
        pending: ledger.pending(titles).len(),
        retrying: store.retry_entries()?,
    })
}

/// Prints the status to stdout
pub fn print_status(status: &ExtractionStatus) {
    println!("=== Extraction Status ===\n");

    println!("Overview:");
    println!("  Titles queued: {}", status.queued);
    println!("  Records stored: {}", status.extracted);
    println!("  Pending: {}", status.pending);
    println!("  Completion: {:.1}%", status.completion());
    println!();

    if status.retrying.is_empty() {
        println!("Retry list is empty");
        return;
    }

    println!("Retry List ({}):", status.retrying.len());
    for entry in &status.retrying {
        println!(
            "  - {} ({} attempts, last {}): {}",
            entry.title, entry.attempts, entry.last_attempt_at, entry.reason
        );
    }
}
