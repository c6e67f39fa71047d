//! Typed views over the upstream item, monster and prayer records
//!
//! Only the fields the pipelines read are typed. Everything else is kept in
//! `extra` so the "complete" output files reproduce each record unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Equipment slot an item occupies when worn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentSlot {
    Ammo,
    Body,
    Cape,
    Feet,
    Hands,
    Head,
    Legs,
    Neck,
    Ring,
    Shield,
    #[serde(rename = "2h")]
    TwoHanded,
    Weapon,
}

impl EquipmentSlot {
    /// Name used in output file names, e.g. `items-2h.json`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ammo => "ammo",
            Self::Body => "body",
            Self::Cape => "cape",
            Self::Feet => "feet",
            Self::Hands => "hands",
            Self::Head => "head",
            Self::Legs => "legs",
            Self::Neck => "neck",
            Self::Ring => "ring",
            Self::Shield => "shield",
            Self::TwoHanded => "2h",
            Self::Weapon => "weapon",
        }
    }
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equipment block of an item record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub slot: EquipmentSlot,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single item from the item dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub members: bool,
    #[serde(default)]
    pub quest_item: bool,
    #[serde(default)]
    pub duplicate: bool,
    #[serde(default)]
    pub equipable_by_player: bool,
    #[serde(default)]
    pub noted: bool,
    #[serde(default)]
    pub placeholder: bool,
    #[serde(default)]
    pub equipment: Option<Equipment>,
    #[serde(default)]
    pub lowalch: Option<u32>,
    #[serde(default)]
    pub highalch: Option<u32>,
    #[serde(default)]
    pub examine: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItemRecord {
    /// Slot the player can wear this item in, if any
    pub fn equipment_slot(&self) -> Option<EquipmentSlot> {
        if !self.equipable_by_player {
            return None;
        }
        self.equipment.as_ref().map(|equipment| equipment.slot)
    }
}

/// Drop quantity as published by the monster dataset
///
/// Usually an integer, but ranges such as `"5-10"` and lists such as
/// `"1,2"` occur in the real data. Comparison is exact on the raw value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Exact(i64),
    Text(String),
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One entry in a monster's drop table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropRecord {
    #[serde(rename = "id")]
    pub item_id: u32,
    pub quantity: Quantity,
    #[serde(default)]
    pub rarity: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single monster from the monster dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub combat_level: u32,
    #[serde(default)]
    pub members: bool,
    #[serde(default)]
    pub wiki_url: String,
    #[serde(default)]
    pub drops: Vec<DropRecord>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single prayer from the prayer dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerRecord {
    pub id: u32,
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Records that carry a unique numeric id
pub trait Keyed {
    fn key(&self) -> u32;
}

impl Keyed for ItemRecord {
    fn key(&self) -> u32 {
        self.id
    }
}

impl Keyed for MonsterRecord {
    fn key(&self) -> u32 {
        self.id
    }
}

impl Keyed for PrayerRecord {
    fn key(&self) -> u32 {
        self.id
    }
}
