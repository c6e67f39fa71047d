//! Dataset readers
//!
//! A dataset lives either in a directory holding one `<id>.json` file per
//! record, or in a single JSON file mapping id to record. Either way the
//! records come back ordered by id.

use crate::dataset::types::{ItemRecord, Keyed, MonsterRecord, PrayerRecord};
use crate::dataset::{DatasetError, DatasetResult};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Loads every record of a dataset, ordered by id
///
/// # Arguments
///
/// * `path` - A directory of per-record JSON files, or one JSON map file
///
/// # Returns
///
/// * `Ok(Vec<T>)` - The records sorted by id
/// * `Err(DatasetError)` - The path could not be read or a record did not parse
pub fn load_records<T>(path: &Path) -> DatasetResult<Vec<T>>
where
    T: DeserializeOwned + Keyed,
{
    let metadata = fs::metadata(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut records = if metadata.is_dir() {
        load_directory(path)?
    } else {
        load_map_file(path)?
    };

    records.sort_by_key(|record: &T| record.key());
    check_unique(&records, path)?;

    tracing::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

pub fn load_items(path: &Path) -> DatasetResult<Vec<ItemRecord>> {
    load_records(path)
}

pub fn load_monsters(path: &Path) -> DatasetResult<Vec<MonsterRecord>> {
    load_records(path)
}

pub fn load_prayers(path: &Path) -> DatasetResult<Vec<PrayerRecord>> {
    load_records(path)
}

fn load_directory<T: DeserializeOwned>(dir: &Path) -> DatasetResult<Vec<T>> {
    let entries = fs::read_dir(dir).map_err(|source| DatasetError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut records = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DatasetError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        records.push(read_json(&path)?);
    }

    Ok(records)
}

fn load_map_file<T: DeserializeOwned>(path: &Path) -> DatasetResult<Vec<T>> {
    let map: BTreeMap<String, T> = read_json(path)?;
    Ok(map.into_values().collect())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> DatasetResult<T> {
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| DatasetError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Expects `records` to be sorted by id.
fn check_unique<T: Keyed>(records: &[T], path: &Path) -> DatasetResult<()> {
    if let Some(pair) = records.windows(2).find(|pair| pair[0].key() == pair[1].key()) {
        return Err(DatasetError::DuplicateId {
            path: path.display().to_string(),
            id: pair[0].key(),
        });
    }
    Ok(())
}
