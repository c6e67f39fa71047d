//! Configuration module for Lorebox
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use lorebox::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("lorebox.toml")).unwrap();
//! println!("Records go to: {}", config.extraction.output_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DatasetConfig, ExtractionConfig, HttpConfig, ImageConfig, OutputConfig, StoreKind,
    UserAgentConfig, WikiConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
