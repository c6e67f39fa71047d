//! Extraction module for per-title wiki markup
//!
//! This module contains the resumable extraction pipeline, including:
//! - Loading the ordered title queue
//! - Rebuilding the resume ledger from persisted records
//! - Fetching `action=parse` markup from the wiki API
//! - Persisting found pages and parking failures in the retry list

mod coordinator;
mod fetcher;
mod ledger;
mod titles;

pub use coordinator::{ExtractOutcome, ExtractionReport, Extractor};
pub use fetcher::{fetch_wikitext, markup_from_response, wikitext_url, FetchResult};
pub use ledger::{pending_titles, Ledger};
pub use titles::{load_titles, parse_titles};

use crate::config::Config;
use crate::LoreboxError;

/// Runs a complete extraction over the configured title queue
///
/// # Arguments
///
/// * `config` - The Lorebox configuration
/// * `retry_only` - Process only the titles in the retry list
///
/// # Example
///
/// ```no_run
/// use lorebox::config::load_config;
/// use lorebox::extract::run_extraction;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("lorebox.toml"))?;
/// let report = run_extraction(&config, false).await?;
/// println!("{} pages written", report.written);
/// # Ok(())
/// # }
/// ```
pub async fn run_extraction(
    config: &Config,
    retry_only: bool,
) -> Result<ExtractionReport, LoreboxError> {
    let mut extractor = Extractor::new(config)?;

    if retry_only {
        return extractor.run_retries().await;
    }

    let titles = load_titles(&config.extraction.titles_path)?;
    extractor.run(&titles).await
}
