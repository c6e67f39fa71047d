//! Knowledge-base files under the docs directory

use crate::aggregate::DropTable;
use crate::dataset::{EquipmentSlot, ItemRecord, Keyed, MonsterRecord, PrayerRecord};
use crate::output::search::items_search;
use crate::output::writer::{write_json_atomic, JsonStyle, OutputResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const ITEMS_COMPLETE: &str = "items-complete.json";
pub const MONSTERS_COMPLETE: &str = "monsters-complete.json";
pub const PRAYERS_COMPLETE: &str = "prayers-complete.json";
pub const ITEMS_SEARCH: &str = "items-search.json";
pub const ITEM_DROP_TABLE: &str = "item-drop-table.json";
pub const SLOT_DIR: &str = "items-json-slot";

/// Indexes records by id for the keyed output files
pub fn keyed_by_id<T: Keyed>(records: &[T]) -> BTreeMap<u32, &T> {
    records.iter().map(|record| (record.key(), record)).collect()
}

/// Groups player-equipable items by equipment slot
pub fn items_by_slot(items: &[ItemRecord]) -> BTreeMap<EquipmentSlot, BTreeMap<u32, &ItemRecord>> {
    let mut slots: BTreeMap<EquipmentSlot, BTreeMap<u32, &ItemRecord>> = BTreeMap::new();

    for item in items {
        if let Some(slot) = item.equipment_slot() {
            slots.entry(slot).or_default().insert(item.id, item);
        }
    }

    slots
}

/// Writes the knowledge-base files into one docs directory
#[derive(Debug, Clone)]
pub struct DocsWriter {
    docs_dir: PathBuf,
}

impl DocsWriter {
    pub fn new(docs_dir: &Path) -> Self {
        Self {
            docs_dir: docs_dir.to_path_buf(),
        }
    }

    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.docs_dir.join(file_name)
    }

    /// Path of the slot file for `slot`, e.g. `items-json-slot/items-head.json`
    pub fn slot_path(&self, slot: EquipmentSlot) -> PathBuf {
        self.docs_dir
            .join(SLOT_DIR)
            .join(format!("items-{}.json", slot))
    }

    fn write<T: Serialize + ?Sized>(
        &self,
        path: PathBuf,
        value: &T,
        style: JsonStyle,
    ) -> OutputResult<PathBuf> {
        write_json_atomic(&path, value, style)?;
        tracing::info!("Wrote {}", path.display());
        Ok(path)
    }

    pub fn write_items_complete(&self, items: &[ItemRecord]) -> OutputResult<PathBuf> {
        self.write(self.path_of(ITEMS_COMPLETE), &keyed_by_id(items), JsonStyle::Compact)
    }

    pub fn write_monsters_complete(&self, monsters: &[MonsterRecord]) -> OutputResult<PathBuf> {
        self.write(
            self.path_of(MONSTERS_COMPLETE),
            &keyed_by_id(monsters),
            JsonStyle::Compact,
        )
    }

    pub fn write_prayers_complete(&self, prayers: &[PrayerRecord]) -> OutputResult<PathBuf> {
        self.write(
            self.path_of(PRAYERS_COMPLETE),
            &keyed_by_id(prayers),
            JsonStyle::Compact,
        )
    }

    pub fn write_items_search(&self, items: &[ItemRecord]) -> OutputResult<PathBuf> {
        self.write(self.path_of(ITEMS_SEARCH), &items_search(items), JsonStyle::Indented)
    }

    /// Writes one file per equipment slot that has at least one item
    pub fn write_slot_files(&self, items: &[ItemRecord]) -> OutputResult<Vec<PathBuf>> {
        items_by_slot(items)
            .into_iter()
            .map(|(slot, slot_items)| {
                self.write(self.slot_path(slot), &slot_items, JsonStyle::Compact)
            })
            .collect()
    }

    pub fn write_drop_table(&self, table: &DropTable) -> OutputResult<PathBuf> {
        self.write(self.path_of(ITEM_DROP_TABLE), table, JsonStyle::Indented)
    }
}
