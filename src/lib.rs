//! Lorebox: a game-reference knowledge base builder
//!
//! This crate harvests quest markup from a wiki and joins item and monster
//! datasets into a cross-referenced JSON knowledge base. It has two pipelines:
//! a resumable extraction pipeline and an aggregation pipeline that produces
//! the drop table and the other static JSON files.

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod extract;
pub mod http;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Lorebox operations
#[derive(Debug, Error)]
pub enum LoreboxError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] dataset::DatasetError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read title queue {path}: {source}")]
    TitleQueue {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Lorebox operations
pub type Result<T> = std::result::Result<T, LoreboxError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use aggregate::{build_drop_table, DropTable, ImageCache, ImageResolver, MonsterIdentityKey};
pub use config::Config;
pub use dataset::{DropRecord, ItemRecord, MonsterRecord, PrayerRecord};
pub use extract::{pending_titles, Extractor};
pub use storage::{PageRecord, RecordStore};
