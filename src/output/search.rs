//! Item search index
//!
//! A small per-item summary used by lookup tools that do not need the full
//! item records.

use crate::dataset::ItemRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// How an item appears in the inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Normal,
    Noted,
    Placeholder,
}

impl ItemType {
    /// Noted wins over placeholder when both flags are set
    pub fn of(item: &ItemRecord) -> Self {
        if item.noted {
            Self::Noted
        } else if item.placeholder {
            Self::Placeholder
        } else {
            Self::Normal
        }
    }
}

/// One entry of `items-search.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEntry {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub duplicate: bool,
}

impl SearchEntry {
    pub fn of(item: &ItemRecord) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            item_type: ItemType::of(item),
            duplicate: item.duplicate,
        }
    }
}

/// Builds the search index keyed by item id
pub fn items_search(items: &[ItemRecord]) -> BTreeMap<u32, SearchEntry> {
    items
        .iter()
        .map(|item| (item.id, SearchEntry::of(item)))
        .collect()
}
