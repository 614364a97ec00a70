//! # Items
//!
//! Inventory item definitions and per-instance stat overrides.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Stat keys whose overrides add to the base value instead of replacing it.
pub const BONUS_KEYS: &[&str] = &["attack", "defense", "speed", "chop_power", "mine_power"];

/// Base description of an item kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDefinition {
    pub id: &'static str,
    pub name: &'static str,
    /// Equipment slot, if the item can be equipped
    pub slot: Option<&'static str>,
    pub base_stats: &'static [(&'static str, i64)],
}

const ITEMS: &[ItemDefinition] = &[
    ItemDefinition {
        id: "StoneAxe",
        name: "Stone Axe",
        slot: Some("hand"),
        base_stats: &[("chop_power", 1), ("attack", 1)],
    },
    ItemDefinition {
        id: "Pickaxe",
        name: "Pickaxe",
        slot: Some("hand"),
        base_stats: &[("mine_power", 1)],
    },
    ItemDefinition {
        id: "WoodenSword",
        name: "Wooden Sword",
        slot: Some("hand"),
        base_stats: &[("attack", 2)],
    },
    ItemDefinition {
        id: "LeatherBoots",
        name: "Leather Boots",
        slot: Some("feet"),
        base_stats: &[("defense", 1), ("speed", 1)],
    },
    ItemDefinition {
        id: "Lantern",
        name: "Lantern",
        slot: Some("offhand"),
        base_stats: &[("light", 3)],
    },
];

/// Looks up an item definition by id.
pub fn item_definition(id: &str) -> Option<&'static ItemDefinition> {
    ITEMS.iter().find(|def| def.id == id)
}

/// A concrete item held by the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInstance {
    pub definition_id: String,
    /// Per-instance stat changes, stored as `instance_data` in the player file
    #[serde(rename = "instance_data", default)]
    pub overrides: BTreeMap<String, Value>,
}

impl ItemInstance {
    /// Creates an item without overrides.
    pub fn new(definition_id: impl Into<String>) -> Self {
        Self {
            definition_id: definition_id.into(),
            overrides: BTreeMap::new(),
        }
    }

    /// Adds an override, builder style.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Display name, falling back to the raw id for unknown items.
    pub fn name(&self) -> &str {
        item_definition(&self.definition_id)
            .map(|def| def.name)
            .unwrap_or(self.definition_id.as_str())
    }

    /// Base stats combined with this instance's overrides.
    ///
    /// Numeric overrides on [`BONUS_KEYS`] add to the base value; every other
    /// override replaces it.
    ///
    /// # Examples
    ///
    /// ```
    /// use terratile::ItemInstance;
    /// use serde_json::json;
    ///
    /// let axe = ItemInstance::new("StoneAxe")
    ///     .with_override("chop_power", 2)
    ///     .with_override("label", "Old Faithful");
    /// let stats = axe.effective_stats();
    /// assert_eq!(stats["chop_power"], json!(3));
    /// assert_eq!(stats["label"], json!("Old Faithful"));
    /// ```
    pub fn effective_stats(&self) -> BTreeMap<String, Value> {
        let mut stats: BTreeMap<String, Value> = item_definition(&self.definition_id)
            .map(|def| {
                def.base_stats
                    .iter()
                    .map(|(key, value)| (key.to_string(), Value::from(*value)))
                    .collect()
            })
            .unwrap_or_default();

        for (key, value) in &self.overrides {
            let combined = match stats.get(key) {
                Some(base) if BONUS_KEYS.contains(&key.as_str()) => add_numbers(base, value),
                _ => None,
            };
            stats.insert(key.clone(), combined.unwrap_or_else(|| value.clone()));
        }
        stats
    }
}

fn add_numbers(base: &Value, bonus: &Value) -> Option<Value> {
    if let (Some(a), Some(b)) = (base.as_i64(), bonus.as_i64()) {
        return Some(Value::from(a + b));
    }
    match (base.as_f64(), bonus.as_f64()) {
        (Some(a), Some(b)) => Some(Value::from(a + b)),
        _ => None,
    }
}
