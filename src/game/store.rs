//! # Layered Tile Store
//!
//! Sparse mapping from world coordinates to per-tile layer contents.
//!
//! Every present cell has exactly one floor plus ordered sequences for the
//! stacked layers. Paint order on a cell is the floor, then the stacked layers
//! in ascending z-index, then insertion order inside a layer. Collision is
//! decided by the topmost instance alone.

use crate::game::tiles::{ids, registry, LogicalLayer, TileDefinition};
use crate::game::Position;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A placed tile. Style is looked up from the registry, never cached here.
///
/// Serializes to the `{x, y, definition_id}` shape used by map files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileInstance {
    pub x: i32,
    pub y: i32,
    pub definition_id: String,
}

impl TileInstance {
    /// Creates an instance of `definition_id` at `(x, y)`.
    pub fn new(x: i32, y: i32, definition_id: impl Into<String>) -> Self {
        Self {
            x,
            y,
            definition_id: definition_id.into(),
        }
    }

    /// Creates an instance at a position.
    pub fn at(position: Position, definition_id: impl Into<String>) -> Self {
        Self::new(position.x, position.y, definition_id)
    }

    /// Fallback floor instance for a cell.
    pub fn fallback(position: Position) -> Self {
        Self::at(position, ids::EMPTY_FLOOR)
    }

    /// The cell this instance occupies.
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// The registry definition, falling back for unknown ids.
    pub fn definition(&self) -> &'static TileDefinition {
        registry().get(&self.definition_id)
    }

    /// Whether this instance has the given definition id.
    pub fn is(&self, definition_id: &str) -> bool {
        self.definition_id == definition_id
    }
}

/// Contents of a single cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileRecord {
    floor: Option<TileInstance>,
    previous_floor: Option<TileInstance>,
    objects: Vec<TileInstance>,
    items: Vec<TileInstance>,
    entities: Vec<TileInstance>,
    overhead: Vec<TileInstance>,
}

impl TileRecord {
    fn with_floor(floor: TileInstance) -> Self {
        Self {
            floor: Some(floor),
            ..Self::default()
        }
    }

    /// The current floor. Always present for records held by a store.
    pub fn floor(&self) -> Option<&TileInstance> {
        self.floor.as_ref()
    }

    /// The floor that a removal of the current floor would restore.
    pub fn previous_floor(&self) -> Option<&TileInstance> {
        self.previous_floor.as_ref()
    }

    /// Instances held in `layer`, in insertion order.
    pub fn layer(&self, layer: LogicalLayer) -> &[TileInstance] {
        match layer {
            LogicalLayer::Floor => self.floor.as_ref().map(std::slice::from_ref).unwrap_or(&[]),
            LogicalLayer::Objects => &self.objects,
            LogicalLayer::Items => &self.items,
            LogicalLayer::Entities => &self.entities,
            LogicalLayer::Overhead => &self.overhead,
            LogicalLayer::UiHud | LogicalLayer::UiMenu => &[],
        }
    }

    fn layer_mut(&mut self, layer: LogicalLayer) -> Option<&mut Vec<TileInstance>> {
        match layer {
            LogicalLayer::Objects => Some(&mut self.objects),
            LogicalLayer::Items => Some(&mut self.items),
            LogicalLayer::Entities => Some(&mut self.entities),
            LogicalLayer::Overhead => Some(&mut self.overhead),
            LogicalLayer::Floor | LogicalLayer::UiHud | LogicalLayer::UiMenu => None,
        }
    }

    /// Whether any stacked layer holds an instance.
    pub fn has_stacked_contents(&self) -> bool {
        LogicalLayer::STACKED
            .iter()
            .any(|&layer| !self.layer(layer).is_empty())
    }

    /// Every instance on the cell in paint order.
    pub fn paint_order(&self) -> impl Iterator<Item = &TileInstance> {
        self.floor.iter().chain(
            LogicalLayer::STACKED
                .iter()
                .flat_map(move |&layer| self.layer(layer).iter()),
        )
    }

    fn is_collapsible(&self) -> bool {
        self.previous_floor.is_none()
            && !self.has_stacked_contents()
            && self
                .floor
                .as_ref()
                .map_or(true, |floor| floor.is(ids::EMPTY_FLOOR))
    }
}

/// Input forms accepted by [`LayeredTileStore::ensure_layered`].
#[derive(Debug, Clone)]
pub enum TileSource {
    /// Instances in placement order
    Flat(Vec<TileInstance>),
    /// Legacy form: a list of instances per cell
    PerTile(HashMap<Position, Vec<TileInstance>>),
    /// Already layered
    Layered(LayeredTileStore),
}

/// Sparse layered tile storage for an unbounded world.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayeredTileStore {
    tiles: HashMap<Position, TileRecord>,
}

impl LayeredTileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts any accepted tile source into a layered store.
    ///
    /// A store that is already layered is returned unchanged.
    pub fn ensure_layered(source: TileSource) -> Self {
        match source {
            TileSource::Layered(store) => store,
            TileSource::Flat(instances) => instances.into_iter().collect(),
            TileSource::PerTile(per_tile) => {
                let mut positions: Vec<Position> = per_tile.keys().copied().collect();
                positions.sort_by_key(|p| (p.y, p.x));
                let mut per_tile = per_tile;
                let mut store = Self::new();
                for pos in positions {
                    for instance in per_tile.remove(&pos).unwrap_or_default() {
                        store.place(instance);
                    }
                }
                store
            }
        }
    }

    /// Places an instance, routed by its definition's layer.
    ///
    /// A floor replaces the current floor (which is remembered for restore)
    /// unless it has the same definition id. Any other layer appends to the
    /// cell's sequence, creating the cell with a fallback floor if needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use terratile::{ids, LayeredTileStore, Position, TileInstance};
    ///
    /// let mut store = LayeredTileStore::new();
    /// store.place(TileInstance::new(1, 1, ids::GRASS));
    /// store.place(TileInstance::new(1, 1, ids::ROCK));
    /// let ids: Vec<&str> = store
    ///     .objects_at(Position::new(1, 1))
    ///     .iter()
    ///     .map(|t| t.definition_id.as_str())
    ///     .collect();
    /// assert_eq!(ids, vec!["Grass", "Rock"]);
    /// assert!(store.is_blocked(Position::new(1, 1)));
    /// ```
    pub fn place(&mut self, mut instance: TileInstance) {
        let definition = instance.definition();
        if definition.id != instance.definition_id {
            debug!(
                "Unknown tile id {} placed at ({}, {}), using {}",
                instance.definition_id, instance.x, instance.y, definition.id
            );
            instance.definition_id = definition.id.to_string();
        }
        let position = instance.position();

        match definition.layer {
            LogicalLayer::Floor => {
                let record = self.tiles.entry(position).or_default();
                match record.floor.take() {
                    Some(existing) if existing.definition_id == instance.definition_id => {
                        record.floor = Some(existing);
                    }
                    Some(existing) => {
                        record.previous_floor = Some(existing);
                        record.floor = Some(instance);
                    }
                    None => record.floor = Some(instance),
                }
            }
            layer => {
                let record = self
                    .tiles
                    .entry(position)
                    .or_insert_with(|| TileRecord::with_floor(TileInstance::fallback(position)));
                match record.layer_mut(layer) {
                    Some(sequence) => sequence.push(instance),
                    None => warn!(
                        "Tile {} belongs to interface layer {:?} and cannot be placed",
                        instance.definition_id, layer
                    ),
                }
            }
        }
    }

    /// Removes an instance. Returns whether anything was removed.
    ///
    /// Removing the current floor restores the previous floor when one is
    /// remembered and falls back to `EmptyFloor` otherwise. A cell left with
    /// only a fallback floor is dropped from the store.
    pub fn remove(&mut self, instance: &TileInstance) -> bool {
        let position = instance.position();
        let Some(record) = self.tiles.get_mut(&position) else {
            return false;
        };

        let layer = registry().get(&instance.definition_id).layer;
        let removed = match layer {
            LogicalLayer::Floor => {
                if record.floor.as_ref() == Some(instance) {
                    record.floor = record.previous_floor.take();
                    true
                } else {
                    false
                }
            }
            layer => match record.layer_mut(layer) {
                Some(sequence) => match sequence.iter().position(|t| t == instance) {
                    Some(index) => {
                        sequence.remove(index);
                        true
                    }
                    None => false,
                },
                None => false,
            },
        };

        if removed {
            if record.floor.is_none() {
                record.floor = Some(TileInstance::fallback(position));
            }
            if record.is_collapsible() {
                self.tiles.remove(&position);
            }
        }
        removed
    }

    /// Every instance on a cell in paint order: floor, stacked layers by
    /// ascending z-index, insertion order within a layer.
    pub fn objects_at(&self, position: Position) -> Vec<&TileInstance> {
        self.tiles
            .get(&position)
            .map(|record| record.paint_order().collect())
            .unwrap_or_default()
    }

    /// The instance painted last on a cell.
    pub fn topmost(&self, position: Position) -> Option<&TileInstance> {
        self.tiles
            .get(&position)
            .and_then(|record| record.paint_order().last())
    }

    /// Whether the topmost instance on a cell blocks movement.
    ///
    /// Absent cells never block.
    pub fn is_blocked(&self, position: Position) -> bool {
        self.topmost(position)
            .map(|top| top.definition().blocking)
            .unwrap_or(false)
    }

    /// The floor instance of a cell.
    pub fn floor_at(&self, position: Position) -> Option<&TileInstance> {
        self.tiles.get(&position).and_then(|record| record.floor())
    }

    /// The first instance with `definition_id` on a cell, in paint order.
    pub fn find_at(&self, position: Position, definition_id: &str) -> Option<&TileInstance> {
        self.tiles
            .get(&position)
            .and_then(|record| record.paint_order().find(|t| t.is(definition_id)))
    }

    /// Whether any instance with `definition_id` is on a cell.
    pub fn contains_at(&self, position: Position, definition_id: &str) -> bool {
        self.find_at(position, definition_id).is_some()
    }

    /// The full record of a cell.
    pub fn record(&self, position: Position) -> Option<&TileRecord> {
        self.tiles.get(&position)
    }

    /// Number of present cells.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the store holds no cells.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Present cell positions, in no particular order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles.keys().copied()
    }

    /// Flattens the store into placement order for serialization.
    ///
    /// Cells are emitted in row-major order and each cell in paint order, so
    /// placing the result into an empty store rebuilds the same layers.
    /// Remembered previous floors are not part of the output.
    pub fn to_scenery(&self) -> Vec<TileInstance> {
        let mut positions: Vec<Position> = self.tiles.keys().copied().collect();
        positions.sort_by_key(|p| (p.y, p.x));
        positions
            .into_iter()
            .flat_map(|pos| self.tiles[&pos].paint_order().cloned().collect::<Vec<_>>())
            .collect()
    }
}

impl FromIterator<TileInstance> for LayeredTileStore {
    fn from_iter<I: IntoIterator<Item = TileInstance>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl Extend<TileInstance> for LayeredTileStore {
    fn extend<I: IntoIterator<Item = TileInstance>>(&mut self, iter: I) {
        for instance in iter {
            self.place(instance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids_at(store: &LayeredTileStore, x: i32, y: i32) -> Vec<String> {
        store
            .objects_at(Position::new(x, y))
            .into_iter()
            .map(|t| t.definition_id.clone())
            .collect()
    }

    #[test]
    fn test_floor_replacement_remembers_previous() {
        let mut store = LayeredTileStore::new();
        store.place(TileInstance::new(0, 0, ids::GRASS));
        store.place(TileInstance::new(0, 0, ids::SAND));

        let record = store.record(Position::new(0, 0)).unwrap();
        assert_eq!(record.floor().unwrap().definition_id, ids::SAND);
        assert_eq!(record.previous_floor().unwrap().definition_id, ids::GRASS);

        assert!(store.remove(&TileInstance::new(0, 0, ids::SAND)));
        let record = store.record(Position::new(0, 0)).unwrap();
        assert_eq!(record.floor().unwrap().definition_id, ids::GRASS);
        assert!(record.previous_floor().is_none());
    }

    #[test]
    fn test_same_floor_is_noop() {
        let mut store = LayeredTileStore::new();
        store.place(TileInstance::new(3, 3, ids::GRASS));
        store.place(TileInstance::new(3, 3, ids::SAND));
        let before = store.clone();
        store.place(TileInstance::new(3, 3, ids::SAND));
        assert_eq!(store, before);
    }

    #[test]
    fn test_floor_change_keeps_stacked_layers() {
        let mut store = LayeredTileStore::new();
        store.place(TileInstance::new(1, 2, ids::GRASS));
        store.place(TileInstance::new(1, 2, ids::FLOWER));
        store.place(TileInstance::new(1, 2, ids::PATH));
        assert_eq!(ids_at(&store, 1, 2), vec![ids::PATH, ids::FLOWER]);
    }

    #[test]
    fn test_stacked_place_creates_fallback_floor() {
        let mut store = LayeredTileStore::new();
        store.place(TileInstance::new(-4, 7, ids::ROCK));
        assert_eq!(ids_at(&store, -4, 7), vec![ids::EMPTY_FLOOR, ids::ROCK]);
    }

    #[test]
    fn test_paint_order_by_layer_then_insertion() {
        let mut store = LayeredTileStore::new();
        store.place(TileInstance::new(0, 0, ids::TREE_TOP));
        store.place(TileInstance::new(0, 0, ids::COIN));
        store.place(TileInstance::new(0, 0, ids::ROCK));
        store.place(TileInstance::new(0, 0, ids::FLOWER));
        store.place(TileInstance::new(0, 0, ids::GRASS));
        assert_eq!(
            ids_at(&store, 0, 0),
            vec![ids::GRASS, ids::ROCK, ids::COIN, ids::FLOWER, ids::TREE_TOP]
        );
        assert_eq!(
            store.topmost(Position::new(0, 0)).unwrap().definition_id,
            ids::TREE_TOP
        );
    }

    #[test]
    fn test_duplicates_are_kept_and_removed_one_at_a_time() {
        let mut store = LayeredTileStore::new();
        let rock = TileInstance::new(2, 2, ids::ROCK);
        store.place(rock.clone());
        store.place(rock.clone());
        assert_eq!(ids_at(&store, 2, 2).len(), 3);
        assert!(store.remove(&rock));
        assert_eq!(ids_at(&store, 2, 2), vec![ids::EMPTY_FLOOR, ids::ROCK]);
    }

    #[test]
    fn test_removing_last_object_collapses_fallback_cell() {
        let mut store = LayeredTileStore::new();
        let rock = TileInstance::new(5, 5, ids::ROCK);
        store.place(rock.clone());
        assert!(store.remove(&rock));
        assert!(store.record(Position::new(5, 5)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_removing_floor_without_previous_falls_back() {
        let mut store = LayeredTileStore::new();
        let grass = TileInstance::new(0, 0, ids::GRASS);
        store.place(grass.clone());
        store.place(TileInstance::new(0, 0, ids::FLOWER));
        assert!(store.remove(&grass));
        assert_eq!(ids_at(&store, 0, 0), vec![ids::EMPTY_FLOOR, ids::FLOWER]);
    }

    #[test]
    fn test_remove_missing_instance_returns_false() {
        let mut store = LayeredTileStore::new();
        assert!(!store.remove(&TileInstance::new(0, 0, ids::ROCK)));
        store.place(TileInstance::new(0, 0, ids::GRASS));
        assert!(!store.remove(&TileInstance::new(0, 0, ids::ROCK)));
        assert!(!store.remove(&TileInstance::new(0, 0, ids::SAND)));
        assert_eq!(ids_at(&store, 0, 0), vec![ids::GRASS]);
    }

    #[test]
    fn test_blocking_uses_topmost_only() {
        let mut store = LayeredTileStore::new();
        let pos = Position::new(4, 10);
        assert!(!store.is_blocked(pos));
        store.place(TileInstance::at(pos, ids::RIVER));
        assert!(store.is_blocked(pos));
        store.place(TileInstance::at(pos, ids::BRIDGE));
        assert!(!store.is_blocked(pos));
    }

    #[test]
    fn test_unknown_id_is_treated_as_fallback_floor() {
        let mut store = LayeredTileStore::new();
        store.place(TileInstance::new(0, 0, "Mystery"));
        assert_eq!(ids_at(&store, 0, 0), vec![ids::EMPTY_FLOOR]);
        assert!(!store.is_blocked(Position::new(0, 0)));
    }

    #[test]
    fn test_ensure_layered_from_per_tile_lists() {
        let mut legacy = HashMap::new();
        legacy.insert(
            Position::new(1, 1),
            vec![
                TileInstance::new(1, 1, ids::GRASS),
                TileInstance::new(1, 1, ids::TREE_TOP),
                TileInstance::new(1, 1, ids::ROCK),
            ],
        );
        let store = LayeredTileStore::ensure_layered(TileSource::PerTile(legacy));
        assert_eq!(
            ids_at(&store, 1, 1),
            vec![ids::GRASS, ids::ROCK, ids::TREE_TOP]
        );

        let again = LayeredTileStore::ensure_layered(TileSource::Layered(store.clone()));
        assert_eq!(again, store);
    }

    #[test]
    fn test_to_scenery_rebuilds_same_layers() {
        let mut store = LayeredTileStore::new();
        store.place(TileInstance::new(3, 1, ids::GRASS));
        store.place(TileInstance::new(3, 1, ids::ROCK));
        store.place(TileInstance::new(0, 2, ids::RIVER));
        store.place(TileInstance::new(0, 2, ids::BRIDGE));
        store.place(TileInstance::new(9, 0, ids::TREE_TOP));

        let scenery = store.to_scenery();
        assert_eq!(scenery[0].position(), Position::new(9, 0));
        let rebuilt: LayeredTileStore = scenery.into_iter().collect();
        for pos in store.positions() {
            assert_eq!(rebuilt.objects_at(pos), store.objects_at(pos));
        }
        assert_eq!(rebuilt.len(), store.len());
    }
}
