//! # Player
//!
//! The player character: position, facing, resources, inventory and movement.

use crate::game::items::{item_definition, ItemInstance};
use crate::game::state::DebugFlags;
use crate::game::store::LayeredTileStore;
use crate::game::{Facing, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Equipment slots every player has, filled or not.
pub const EQUIPMENT_SLOTS: &[&str] = &["hand", "offhand", "feet"];

/// The player character.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    pub hp: u32,
    pub level: u32,
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    pub glyph: char,
    /// Foreground color name
    pub foreground: String,
    pub gold: u32,
    pub wood: u32,
    pub stone: u32,
    pub inventory: Vec<ItemInstance>,
    pub equipped: BTreeMap<String, Option<ItemInstance>>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new("Wanderer", Position::origin())
    }
}

impl Player {
    /// Creates a fresh player with the starting kit.
    ///
    /// # Examples
    ///
    /// ```
    /// use terratile::{Player, Position};
    ///
    /// let player = Player::new("Hero", Position::new(5, 5));
    /// assert_eq!(player.position(), Position::new(5, 5));
    /// assert_eq!(player.wood, 0);
    /// ```
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            hp: 10,
            level: 1,
            x: position.x,
            y: position.y,
            facing: Facing::Down,
            glyph: '@',
            foreground: "yellow".to_string(),
            gold: 0,
            wood: 0,
            stone: 0,
            inventory: vec![ItemInstance::new("StoneAxe"), ItemInstance::new("Pickaxe")],
            equipped: EQUIPMENT_SLOTS
                .iter()
                .map(|slot| (slot.to_string(), None))
                .collect(),
        }
    }

    /// Current cell.
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Moves the player without any collision check.
    pub fn set_position(&mut self, position: Position) {
        self.x = position.x;
        self.y = position.y;
    }

    /// The cell directly in front of the player.
    pub fn front(&self) -> Position {
        self.position().step(self.facing)
    }

    /// Attempts a one-cell step.
    ///
    /// Facing always turns to `direction`; the position only changes when the
    /// target is not blocked or collisions are disabled for debugging.
    pub fn step(&mut self, direction: Facing, store: &LayeredTileStore, debug: &DebugFlags) -> bool {
        self.facing = direction;
        let target = self.position().step(direction);
        if !debug.ignore_collisions && store.is_blocked(target) {
            return false;
        }
        self.set_position(target);
        true
    }

    /// Moves an inventory item into its equipment slot.
    ///
    /// Whatever occupied the slot goes back into the inventory. Returns false
    /// for an out-of-range index or an item without a slot.
    pub fn equip(&mut self, inventory_index: usize) -> bool {
        let Some(item) = self.inventory.get(inventory_index) else {
            return false;
        };
        let Some(slot) = item_definition(&item.definition_id).and_then(|def| def.slot) else {
            return false;
        };
        let item = self.inventory.remove(inventory_index);
        if let Some(Some(previous)) = self.equipped.insert(slot.to_string(), Some(item)) {
            self.inventory.push(previous);
        }
        true
    }

    /// Builds a player from its saved record.
    pub fn from_record(record: PlayerRecord) -> Self {
        let mut player = Self::new(record.name, Position::new(record.x, record.y));
        player.hp = record.hp;
        player.level = record.level;
        player.gold = record.gold;
        player.wood = record.wood;
        player.stone = record.stone;
        player.inventory = record.inventory;
        for (slot, item) in record.equipped {
            player.equipped.insert(slot, item);
        }
        player
    }

    /// Snapshot for the player file.
    pub fn to_record(&self) -> PlayerRecord {
        PlayerRecord {
            name: self.name.clone(),
            hp: self.hp,
            level: self.level,
            x: self.x,
            y: self.y,
            gold: self.gold,
            wood: self.wood,
            stone: self.stone,
            inventory: self.inventory.clone(),
            equipped: self.equipped.clone(),
        }
    }
}

/// On-disk form of the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub hp: u32,
    pub level: u32,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub wood: u32,
    #[serde(default)]
    pub stone: u32,
    #[serde(default)]
    pub inventory: Vec<ItemInstance>,
    #[serde(default)]
    pub equipped: BTreeMap<String, Option<ItemInstance>>,
}
