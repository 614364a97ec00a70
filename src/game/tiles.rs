//! # Tile Definitions
//!
//! The process-wide tile definition registry and the logical layer ordering.
//!
//! Tile instances only carry a definition id; glyph, colors, collision and
//! layer routing are looked up here. The table is built once on first use and
//! never changes afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Well-known definition ids.
pub mod ids {
    pub const EMPTY_FLOOR: &str = "EmptyFloor";
    pub const SEMICOLON_FLOOR: &str = "SemicolonFloor";
    pub const DEBUG_DOT: &str = "DebugDot";
    pub const GRASS: &str = "Grass";
    pub const SAND: &str = "Sand";
    pub const PATH: &str = "Path";
    pub const RIVER: &str = "River";
    pub const BRIDGE: &str = "Bridge";
    pub const BRIDGE_END: &str = "BridgeEnd";
    pub const BRIDGE_TOOL: &str = "BridgeTool";
    pub const TREE: &str = "Tree";
    pub const TREE_TRUNK: &str = "TreeTrunk";
    pub const TREE_TOP: &str = "TreeTop";
    pub const ROCK: &str = "Rock";
    pub const WALL: &str = "Wall";
    pub const FLOWER: &str = "Flower";
    pub const COIN: &str = "Coin";
}

/// Logical layers, declared bottom to top.
///
/// The derived ordering follows the z-index, so sorting layers sorts them
/// into paint order. The UI layers never hold tiles in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalLayer {
    Floor,
    Objects,
    Items,
    Entities,
    Overhead,
    UiHud,
    UiMenu,
}

impl LogicalLayer {
    /// Non-floor layers that hold ordered tile sequences, in paint order.
    pub const STACKED: [LogicalLayer; 4] = [
        LogicalLayer::Objects,
        LogicalLayer::Items,
        LogicalLayer::Entities,
        LogicalLayer::Overhead,
    ];

    /// Z-index of the layer.
    pub fn z_index(self) -> i32 {
        match self {
            LogicalLayer::Floor => 0,
            LogicalLayer::Objects => 10,
            LogicalLayer::Items => 20,
            LogicalLayer::Entities => 30,
            LogicalLayer::Overhead => 40,
            LogicalLayer::UiHud => 100,
            LogicalLayer::UiMenu => 400,
        }
    }

    /// Whether this layer belongs to the interface rather than the world.
    pub fn is_ui(self) -> bool {
        matches!(self, LogicalLayer::UiHud | LogicalLayer::UiMenu)
    }
}

/// Static description of one kind of tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileDefinition {
    /// Registry key
    pub id: &'static str,
    /// Single printable glyph
    pub glyph: char,
    /// Foreground color name, resolved through a `ColorTable`
    pub foreground: &'static str,
    /// Background color name, resolved through a `ColorTable`
    pub background: &'static str,
    /// Whether the tile stops movement when it is topmost on its cell
    pub blocking: bool,
    /// Whether the editor palette offers this id
    pub placeable: bool,
    /// Layer the tile is stored in
    pub layer: LogicalLayer,
}

impl TileDefinition {
    const fn new(
        id: &'static str,
        glyph: char,
        foreground: &'static str,
        background: &'static str,
        blocking: bool,
        placeable: bool,
        layer: LogicalLayer,
    ) -> Self {
        Self {
            id,
            glyph,
            foreground,
            background,
            blocking,
            placeable,
            layer,
        }
    }
}

const BUILTIN: &[TileDefinition] = &[
    TileDefinition::new(ids::EMPTY_FLOOR, ' ', "white", "black", false, true, LogicalLayer::Floor),
    TileDefinition::new(ids::SEMICOLON_FLOOR, ';', "dark_green", "black", false, true, LogicalLayer::Floor),
    TileDefinition::new(ids::DEBUG_DOT, '.', "grey", "black", false, false, LogicalLayer::Floor),
    TileDefinition::new(ids::GRASS, '"', "bright_green", "grass", false, true, LogicalLayer::Floor),
    TileDefinition::new(ids::SAND, '.', "yellow", "sand", false, true, LogicalLayer::Floor),
    TileDefinition::new(ids::PATH, ':', "brown", "path", false, true, LogicalLayer::Floor),
    TileDefinition::new(ids::RIVER, '~', "bright_blue", "water", true, true, LogicalLayer::Floor),
    TileDefinition::new(ids::BRIDGE, '=', "brown", "black", false, false, LogicalLayer::Objects),
    TileDefinition::new(ids::BRIDGE_END, '+', "brown", "black", false, false, LogicalLayer::Objects),
    TileDefinition::new(ids::BRIDGE_TOOL, 'H', "brown", "black", false, true, LogicalLayer::Objects),
    TileDefinition::new(ids::TREE, 'T', "green", "black", true, true, LogicalLayer::Objects),
    TileDefinition::new(ids::TREE_TRUNK, '|', "brown", "black", true, false, LogicalLayer::Objects),
    TileDefinition::new(ids::TREE_TOP, '^', "bright_green", "black", false, false, LogicalLayer::Overhead),
    TileDefinition::new(ids::ROCK, 'o', "grey", "black", true, true, LogicalLayer::Objects),
    TileDefinition::new(ids::WALL, '#', "white", "black", true, true, LogicalLayer::Objects),
    TileDefinition::new(ids::FLOWER, '*', "red", "black", false, true, LogicalLayer::Items),
    TileDefinition::new(ids::COIN, '$', "yellow", "black", false, true, LogicalLayer::Items),
];

/// Immutable table from definition id to [`TileDefinition`].
#[derive(Debug)]
pub struct TileRegistry {
    definitions: Vec<TileDefinition>,
    index: HashMap<&'static str, usize>,
    fallback: usize,
}

static REGISTRY: OnceLock<TileRegistry> = OnceLock::new();

/// Shortcut for [`TileRegistry::global`].
pub fn registry() -> &'static TileRegistry {
    TileRegistry::global()
}

impl TileRegistry {
    /// Builds a registry from the built-in definitions.
    pub fn builtin() -> Self {
        let definitions = BUILTIN.to_vec();
        let index = definitions
            .iter()
            .enumerate()
            .map(|(i, def)| (def.id, i))
            .collect::<HashMap<_, _>>();
        let fallback = index[ids::EMPTY_FLOOR];
        Self {
            definitions,
            index,
            fallback,
        }
    }

    /// Returns the process-wide registry, building it on first use.
    pub fn global() -> &'static TileRegistry {
        REGISTRY.get_or_init(TileRegistry::builtin)
    }

    /// Looks up a definition, resolving unknown ids to the fallback floor.
    ///
    /// # Examples
    ///
    /// ```
    /// use terratile::{registry, ids};
    ///
    /// assert_eq!(registry().get(ids::RIVER).glyph, '~');
    /// assert_eq!(registry().get("NoSuchTile").id, ids::EMPTY_FLOOR);
    /// ```
    pub fn get(&self, id: &str) -> &TileDefinition {
        self.lookup(id).unwrap_or(&self.definitions[self.fallback])
    }

    /// Looks up a definition without falling back.
    pub fn lookup(&self, id: &str) -> Option<&TileDefinition> {
        self.index.get(id).map(|&i| &self.definitions[i])
    }

    /// Returns whether the id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Maps an id to its canonical registered form, unknown ids becoming the fallback.
    pub fn resolve_id(&self, id: &str) -> &'static str {
        self.get(id).id
    }

    /// The fallback floor definition.
    pub fn fallback(&self) -> &TileDefinition {
        &self.definitions[self.fallback]
    }

    /// Ids offered by the editor palette, in registration order.
    pub fn placeable_ids(&self) -> Vec<&'static str> {
        self.definitions
            .iter()
            .filter(|def| def.placeable)
            .map(|def| def.id)
            .collect()
    }

    /// All registered definitions.
    pub fn definitions(&self) -> &[TileDefinition] {
        &self.definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_id_resolves_to_fallback() {
        let reg = TileRegistry::builtin();
        let def = reg.get("Nonexistent");
        assert_eq!(def.id, ids::EMPTY_FLOOR);
        assert_eq!(def.glyph, ' ');
        assert_eq!(def.foreground, "white");
        assert_eq!(def.background, "black");
        assert_eq!(def.layer, LogicalLayer::Floor);
        assert!(reg.lookup("Nonexistent").is_none());
    }

    #[test]
    fn test_layer_order_follows_z_index() {
        let mut layers = vec![
            LogicalLayer::UiMenu,
            LogicalLayer::Overhead,
            LogicalLayer::Floor,
            LogicalLayer::Items,
            LogicalLayer::UiHud,
            LogicalLayer::Objects,
            LogicalLayer::Entities,
        ];
        layers.sort();
        let z: Vec<i32> = layers.iter().map(|l| l.z_index()).collect();
        let mut sorted = z.clone();
        sorted.sort();
        assert_eq!(z, sorted);
        assert_eq!(layers[0], LogicalLayer::Floor);
        assert!(LogicalLayer::UiHud.is_ui());
        assert!(!LogicalLayer::Overhead.is_ui());
    }

    #[test]
    fn test_placeable_ids_excludes_internal_tiles() {
        let placeable = registry().placeable_ids();
        assert!(placeable.contains(&ids::BRIDGE_TOOL));
        assert!(placeable.contains(&ids::TREE));
        assert!(!placeable.contains(&ids::TREE_TRUNK));
        assert!(!placeable.contains(&ids::BRIDGE));
        assert!(!placeable.contains(&ids::DEBUG_DOT));
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let reg = TileRegistry::builtin();
        assert_eq!(reg.definitions().len(), BUILTIN.len());
        for def in reg.definitions() {
            assert_eq!(reg.get(def.id), def);
        }
    }

    #[test]
    fn test_tree_parts_layers() {
        assert_eq!(registry().get(ids::TREE_TOP).layer, LogicalLayer::Overhead);
        assert!(registry().get(ids::TREE_TRUNK).blocking);
        assert!(!registry().get(ids::TREE_TOP).blocking);
        assert!(registry().get(ids::RIVER).blocking);
        assert!(!registry().get(ids::BRIDGE).blocking);
    }
}
