//! Item drop table
//!
//! Joins the item and monster datasets into `item → monsters → drops`.
//!
//! The join follows the cross product of items, monsters and drops:
//! - Quest items and duplicates are left out
//! - Within one item's scan, only the first monster of each
//!   [`MonsterIdentityKey`] is considered; later records with the same
//!   identity are skipped even when the first one dropped nothing. The seen
//!   set starts empty for every item.
//! - Within one monster, a drop is kept once per `(item_id, quantity)`
//! - Monsters without kept drops and items without monsters are pruned
//!
//! Because every item scans every monster, the monsters that survive the
//! identity check are the same for all items: the first record of each
//! identity in dataset order. The join uses that to index monsters by the
//! item ids they drop, which gives the same output as the full scan.

use crate::aggregate::cache::{ImageCache, MonsterIdentityKey};
use crate::aggregate::image::ImageResolver;
use crate::dataset::{ItemRecord, MonsterRecord, Quantity};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// One kept drop of an item by a monster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropEntry {
    pub quantity: Quantity,
    pub rarity: Value,
}

/// A monster that drops the item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropTableMonster {
    pub id: u32,
    pub name: String,
    pub members: bool,
    pub combat_level: u32,
    pub wiki_url: String,
    pub drops: Vec<DropEntry>,
    /// Resolved image URL; empty until [`attach_images`] runs or when none exists
    pub image: String,
}

impl DropTableMonster {
    pub fn identity(&self) -> MonsterIdentityKey {
        MonsterIdentityKey::new(self.combat_level, self.name.clone())
    }
}

/// An item with every monster that drops it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropTableItem {
    pub id: u32,
    pub name: String,
    pub members: bool,
    pub lowalch: Option<u32>,
    pub highalch: Option<u32>,
    pub examine: Option<String>,
    pub monsters: Vec<DropTableMonster>,
}

/// The complete drop table, serialized as `{"items": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DropTable {
    pub items: Vec<DropTableItem>,
}

impl DropTable {
    /// Total monster entries across all items
    pub fn monster_entries(&self) -> usize {
        self.items.iter().map(|item| item.monsters.len()).sum()
    }

    pub fn item(&self, id: u32) -> Option<&DropTableItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Whether an item takes part in the drop table at all
pub fn is_excluded(item: &ItemRecord) -> bool {
    item.quest_item || item.duplicate
}

/// First record of each monster identity, in dataset order
fn identity_representatives(monsters: &[MonsterRecord]) -> Vec<&MonsterRecord> {
    let mut seen = HashSet::new();
    monsters
        .iter()
        .filter(|monster| seen.insert(MonsterIdentityKey::of(monster)))
        .collect()
}

/// Maps item id to the positions of the representatives that drop it
fn index_by_item(representatives: &[&MonsterRecord]) -> HashMap<u32, Vec<usize>> {
    let mut index: HashMap<u32, Vec<usize>> = HashMap::new();

    for (position, monster) in representatives.iter().enumerate() {
        for drop in &monster.drops {
            let positions = index.entry(drop.item_id).or_default();
            if positions.last() != Some(&position) {
                positions.push(position);
            }
        }
    }

    index
}

/// Kept drops of one item by one monster
fn monster_drops(monster: &MonsterRecord, item_id: u32) -> Vec<DropEntry> {
    let mut seen: HashSet<(u32, &Quantity)> = HashSet::new();

    monster
        .drops
        .iter()
        .filter(|drop| drop.item_id == item_id)
        .filter(|drop| seen.insert((drop.item_id, &drop.quantity)))
        .map(|drop| DropEntry {
            quantity: drop.quantity.clone(),
            rarity: drop.rarity.clone(),
        })
        .collect()
}

fn monster_entry(monster: &MonsterRecord, drops: Vec<DropEntry>) -> DropTableMonster {
    DropTableMonster {
        id: monster.id,
        name: monster.name.clone(),
        members: monster.members,
        combat_level: monster.combat_level,
        wiki_url: monster.wiki_url.clone(),
        drops,
        image: String::new(),
    }
}

/// Builds the drop table from the item and monster datasets
///
/// Images are left empty; [`attach_images`] fills them in.
///
/// # Arguments
///
/// * `items` - Items in output order
/// * `monsters` - Monsters in scan order
pub fn build_drop_table(items: &[ItemRecord], monsters: &[MonsterRecord]) -> DropTable {
    let representatives = identity_representatives(monsters);
    let index = index_by_item(&representatives);

    let mut table = DropTable::default();

    for item in items {
        if is_excluded(item) {
            continue;
        }

        let Some(positions) = index.get(&item.id) else {
            continue;
        };

        let monsters: Vec<DropTableMonster> = positions
            .iter()
            .map(|&position| representatives[position])
            .filter_map(|monster| {
                let drops = monster_drops(monster, item.id);
                (!drops.is_empty()).then(|| monster_entry(monster, drops))
            })
            .collect();

        if monsters.is_empty() {
            continue;
        }

        tracing::info!("Joined {} ({}): {} monsters", item.name, item.id, monsters.len());

        table.items.push(DropTableItem {
            id: item.id,
            name: item.name.clone(),
            members: item.members,
            lowalch: item.lowalch,
            highalch: item.highalch,
            examine: item.examine.clone(),
            monsters,
        });
    }

    table
}

/// Resolves the image of every monster entry, in table order
pub async fn attach_images(table: &mut DropTable, resolver: &ImageResolver, cache: &mut ImageCache) {
    for item in &mut table.items {
        for monster in &mut item.monsters {
            let identity = monster.identity();
            monster.image = resolver
                .resolve_image(cache, &identity, &monster.wiki_url)
                .await;
        }
    }

    tracing::info!(
        "Resolved images for {} monster identities ({} without an image)",
        cache.len(),
        cache.negative_count()
    );
}
