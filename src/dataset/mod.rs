//! Dataset module for the upstream item, monster and prayer collections
//!
//! The datasets are produced elsewhere; this module only reads them into
//! typed, id-ordered collections. Nothing here writes back to a dataset.

mod reader;
mod types;

pub use reader::{load_items, load_monsters, load_prayers, load_records};
pub use types::{
    DropRecord, Equipment, EquipmentSlot, ItemRecord, Keyed, MonsterRecord, PrayerRecord,
    Quantity,
};

use thiserror::Error;

/// Errors that can occur while reading a dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Duplicate id {id} in {path}")]
    DuplicateId { path: String, id: u32 },
}

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
