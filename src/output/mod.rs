//! Output module for the knowledge-base files and reports
//!
//! This module handles:
//! - Writing JSON files atomically
//! - Generating the complete, search and per-slot item files
//! - Writing the item drop table
//! - Reporting extraction status

mod docs;
mod search;
mod status;
mod writer;

pub use docs::{
    items_by_slot, keyed_by_id, DocsWriter, ITEMS_COMPLETE, ITEMS_SEARCH, ITEM_DROP_TABLE,
    MONSTERS_COMPLETE, PRAYERS_COMPLETE, SLOT_DIR,
};
pub use search::{items_search, ItemType, SearchEntry};
pub use status::{load_status, print_status, ExtractionStatus};
pub use writer::{write_json_atomic, JsonStyle, OutputError, OutputResult};
