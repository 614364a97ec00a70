//! # Placement Service
//!
//! Single entry point for putting tiles into the world on behalf of the
//! editor. Tool ids expand into several instances; everything else becomes
//! one instance on the target cell.

use crate::game::store::{LayeredTileStore, TileInstance};
use crate::game::tiles::ids;
use crate::game::{Facing, Position};
use log::debug;

/// Places `definition_id` at `position` and returns what was placed.
///
/// With the editor active, `BridgeTool` spans the river in front of the
/// position along `facing` and `Tree` becomes a trunk with a canopy above it.
/// The returned instances are exactly the ones an undo has to remove.
pub fn place_tile(
    store: &mut LayeredTileStore,
    definition_id: &str,
    position: Position,
    facing: Facing,
    editor_active: bool,
) -> Vec<TileInstance> {
    match definition_id {
        ids::BRIDGE_TOOL if editor_active => place_bridge(store, position, facing),
        ids::TREE if editor_active => place_tree(store, position),
        _ => {
            let instance = TileInstance::at(position, definition_id);
            store.place(instance.clone());
            vec![instance]
        }
    }
}

fn is_river(store: &LayeredTileStore, position: Position) -> bool {
    store
        .floor_at(position)
        .is_some_and(|floor| floor.is(ids::RIVER))
}

fn place_bridge(store: &mut LayeredTileStore, origin: Position, facing: Facing) -> Vec<TileInstance> {
    let mut run = Vec::new();
    let mut cursor = origin.step(facing);
    while is_river(store, cursor) {
        run.push(cursor);
        cursor = cursor.step(facing);
    }
    let (Some(&first), Some(&last)) = (run.first(), run.last()) else {
        debug!("No river in front of ({}, {}), bridge not placed", origin.x, origin.y);
        return Vec::new();
    };

    let mut placed = Vec::new();
    for &cell in &run {
        while let Some(end) = store.find_at(cell, ids::BRIDGE_END).cloned() {
            store.remove(&end);
        }
        let bridge = TileInstance::at(cell, ids::BRIDGE);
        store.place(bridge.clone());
        placed.push(bridge);
    }

    let delta = facing.to_delta();
    for end in [first - delta, last + delta] {
        if !store.contains_at(end, ids::BRIDGE) && !store.contains_at(end, ids::RIVER) {
            let bridge_end = TileInstance::at(end, ids::BRIDGE_END);
            store.place(bridge_end.clone());
            placed.push(bridge_end);
        }
    }
    placed
}

fn place_tree(store: &mut LayeredTileStore, position: Position) -> Vec<TileInstance> {
    let mut placed = vec![TileInstance::at(position, ids::TREE_TRUNK)];
    if position.y > 0 {
        placed.push(TileInstance::new(position.x, position.y - 1, ids::TREE_TOP));
    }
    for instance in &placed {
        store.place(instance.clone());
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn river_row() -> LayeredTileStore {
        let mut store = LayeredTileStore::new();
        store.place(TileInstance::new(2, 10, ids::GRASS));
        for x in 3..=6 {
            store.place(TileInstance::new(x, 10, ids::RIVER));
        }
        store.place(TileInstance::new(7, 10, ids::GRASS));
        store
    }

    #[test]
    fn test_bridge_spans_river_with_ends() {
        let mut store = river_row();
        let placed = place_tile(&mut store, ids::BRIDGE_TOOL, Position::new(2, 10), Facing::Right, true);
        assert_eq!(placed.len(), 6);
        for x in 3..=6 {
            assert!(store.contains_at(Position::new(x, 10), ids::BRIDGE));
            assert!(!store.is_blocked(Position::new(x, 10)));
        }
        assert!(store.contains_at(Position::new(2, 10), ids::BRIDGE_END));
        assert!(store.contains_at(Position::new(7, 10), ids::BRIDGE_END));
    }

    #[test]
    fn test_bridge_needs_river_in_front() {
        let mut store = river_row();
        let before = store.clone();
        let placed = place_tile(&mut store, ids::BRIDGE_TOOL, Position::new(2, 10), Facing::Left, true);
        assert!(placed.is_empty());
        assert_eq!(store, before);
    }

    #[test]
    fn test_bridge_replaces_stale_ends_on_river() {
        let mut store = river_row();
        store.place(TileInstance::new(4, 10, ids::BRIDGE_END));
        place_tile(&mut store, ids::BRIDGE_TOOL, Position::new(2, 10), Facing::Right, true);
        assert!(!store.contains_at(Position::new(4, 10), ids::BRIDGE_END));
        assert!(store.contains_at(Position::new(4, 10), ids::BRIDGE));
    }

    #[test]
    fn test_bridge_end_skipped_next_to_existing_bridge() {
        let mut store = river_row();
        store.place(TileInstance::new(7, 10, ids::BRIDGE));
        let placed = place_tile(&mut store, ids::BRIDGE_TOOL, Position::new(2, 10), Facing::Right, true);
        assert_eq!(placed.len(), 5);
        assert!(!store.contains_at(Position::new(7, 10), ids::BRIDGE_END));
    }

    #[test]
    fn test_tree_tool_places_trunk_and_top() {
        let mut store = LayeredTileStore::new();
        let placed = place_tile(&mut store, ids::TREE, Position::new(3, 3), Facing::Down, true);
        assert_eq!(
            placed,
            vec![
                TileInstance::new(3, 3, ids::TREE_TRUNK),
                TileInstance::new(3, 2, ids::TREE_TOP)
            ]
        );
        let at_edge = place_tile(&mut store, ids::TREE, Position::new(0, 0), Facing::Down, true);
        assert_eq!(at_edge.len(), 1);
    }

    #[test]
    fn test_tools_outside_editor_place_single_instance() {
        let mut store = LayeredTileStore::new();
        let placed = place_tile(&mut store, ids::TREE, Position::new(3, 3), Facing::Down, false);
        assert_eq!(placed, vec![TileInstance::new(3, 3, ids::TREE)]);
    }
}
