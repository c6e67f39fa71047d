//! Extraction coordinator - the resumable title loop
//!
//! This module walks the title queue in order, skips titles the ledger
//! already holds, fetches the rest one at a time and persists each found
//! page as a record. A failed title is parked in the retry list and the loop
//! moves on.

use crate::config::Config;
use crate::extract::fetcher::{fetch_wikitext, FetchResult};
use crate::extract::ledger::Ledger;
use crate::http::build_http_client;
use crate::storage::{open_store, PageRecord, RecordStore};
use crate::LoreboxError;
use reqwest::Client;
use std::collections::HashSet;

/// Outcome of extracting one title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// A new record was written
    Written,

    /// The wiki had no markup for the title; nothing was written
    NotFound,
}

/// Counters for one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub total: usize,
    pub skipped: usize,
    pub written: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl ExtractionReport {
    pub fn processed(&self) -> usize {
        self.skipped + self.written + self.not_found + self.failed
    }
}

/// Runs extraction against one record store
pub struct Extractor {
    client: Client,
    api_url: String,
    store: Box<dyn RecordStore>,
}

impl Extractor {
    /// Creates an extractor from configuration, opening the configured store
    pub fn new(config: &Config) -> Result<Self, LoreboxError> {
        let client = build_http_client(&config.user_agent, &config.http)?;
        let store = open_store(&config.extraction)?;
        Ok(Self::with_store(client, &config.wiki.api_url, store))
    }

    /// Creates an extractor over an already opened store
    pub fn with_store(client: Client, api_url: &str, store: Box<dyn RecordStore>) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            store,
        }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Fetches one title and persists it when the wiki has markup for it
    ///
    /// # Returns
    ///
    /// * `Ok(ExtractOutcome::Written)` - A new record exists for the title
    /// * `Ok(ExtractOutcome::NotFound)` - The wiki had no markup; no side effect
    /// * `Err(LoreboxError)` - Transport, decoding or write failure
    pub async fn extract(&mut self, title: &str) -> Result<ExtractOutcome, LoreboxError> {
        match fetch_wikitext(&self.client, &self.api_url, title).await? {
            FetchResult::Found { markup } => {
                self.store.write_record(&PageRecord::new(title, markup))?;
                Ok(ExtractOutcome::Written)
            }
            FetchResult::NotFound => {
                tracing::debug!("No markup for '{}'", title);
                Ok(ExtractOutcome::NotFound)
            }
        }
    }

    /// Processes a title queue in order
    ///
    /// Titles already in the ledger are skipped without a network call. A
    /// failure on one title lands in the retry list and does not stop the
    /// run; only store failures while maintaining the retry list abort it.
    pub async fn run(&mut self, titles: &[String]) -> Result<ExtractionReport, LoreboxError> {
        let mut ledger = Ledger::load(self.store.as_ref())?;
        let retrying: HashSet<String> = self
            .store
            .retry_entries()?
            .into_iter()
            .map(|entry| entry.title)
            .collect();

        let mut report = ExtractionReport {
            total: titles.len(),
            ..Default::default()
        };

        tracing::info!(
            "Starting extraction: {} titles queued, {} already extracted",
            titles.len(),
            ledger.len()
        );

        for title in titles {
            if ledger.contains(title) {
                report.skipped += 1;
                if retrying.contains(title) {
                    self.store.clear_retry(title)?;
                }
            } else {
                match self.extract(title).await {
                    Ok(outcome) => {
                        match outcome {
                            ExtractOutcome::Written => {
                                report.written += 1;
                                ledger.insert(title);
                            }
                            ExtractOutcome::NotFound => report.not_found += 1,
                        }
                        if retrying.contains(title) {
                            self.store.clear_retry(title)?;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to extract '{}': {}", title, e);
                        report.failed += 1;
                        self.store.record_retry(title, &e.to_string())?;
                    }
                }
            }

            let processed = report.processed();
            tracing::debug!("{} out of {} processed", processed, report.total);
            if processed % 10 == 0 || processed == report.total {
                tracing::info!("{} out of {} processed", processed, report.total);
            }
        }

        tracing::info!(
            "Extraction finished: {} written, {} not found, {} skipped, {} failed",
            report.written,
            report.not_found,
            report.skipped,
            report.failed
        );

        Ok(report)
    }

    /// Processes only the titles currently in the retry list
    pub async fn run_retries(&mut self) -> Result<ExtractionReport, LoreboxError> {
        let titles: Vec<String> = self
            .store
            .retry_entries()?
            .into_iter()
            .map(|entry| entry.title)
            .collect();

        if titles.is_empty() {
            tracing::info!("Retry list is empty");
        }

        self.run(&titles).await
    }
}
