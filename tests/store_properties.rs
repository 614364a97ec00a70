//! Property tests for the layered tile store.

use proptest::prelude::*;
use std::collections::BTreeMap;
use terratile::{ids, registry, LayeredTileStore, LogicalLayer, Position, TileInstance};

const FLOORS: &[&str] = &[ids::EMPTY_FLOOR, ids::GRASS, ids::SAND, ids::PATH, ids::RIVER];
const STACKED: &[&str] = &[
    ids::TREE,
    ids::ROCK,
    ids::WALL,
    ids::BRIDGE,
    ids::FLOWER,
    ids::COIN,
    ids::TREE_TOP,
];

fn any_id() -> impl Strategy<Value = &'static str> {
    prop::sample::select(FLOORS.iter().chain(STACKED).copied().collect::<Vec<_>>())
}

fn stacked_id() -> impl Strategy<Value = &'static str> {
    prop::sample::select(STACKED.to_vec())
}

fn instance(id: impl Strategy<Value = &'static str>) -> impl Strategy<Value = TileInstance> {
    (0..4i32, 0..4i32, id).prop_map(|(x, y, id)| TileInstance::new(x, y, id))
}

/// Cell contents in paint order, ignoring cells that only hold an empty floor.
fn visible(store: &LayeredTileStore) -> BTreeMap<(i32, i32), Vec<String>> {
    store
        .positions()
        .filter_map(|pos| {
            let contents: Vec<String> = store
                .objects_at(pos)
                .iter()
                .map(|tile| tile.definition_id.clone())
                .collect();
            (contents != [ids::EMPTY_FLOOR]).then_some(((pos.x, pos.y), contents))
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_every_record_has_a_floor(tiles in prop::collection::vec(instance(any_id()), 0..40)) {
        let store: LayeredTileStore = tiles.into_iter().collect();
        for pos in store.positions() {
            let floor = store.floor_at(pos);
            prop_assert!(floor.is_some());
            prop_assert_eq!(floor.map(|f| f.definition().layer), Some(LogicalLayer::Floor));
        }
    }

    #[test]
    fn prop_place_then_remove_restores(
        tiles in prop::collection::vec(instance(any_id()), 0..30),
        extra in instance(stacked_id()),
    ) {
        let mut store: LayeredTileStore = tiles.into_iter().collect();
        prop_assume!(!store.contains_at(extra.position(), &extra.definition_id));
        let before = visible(&store);

        store.place(extra.clone());
        prop_assert!(store.contains_at(extra.position(), &extra.definition_id));
        prop_assert!(store.remove(&extra));
        prop_assert_eq!(visible(&store), before);
    }

    #[test]
    fn prop_objects_at_follows_layer_then_insertion(ids in prop::collection::vec(stacked_id(), 1..12)) {
        let pos = Position::new(2, 2);
        let mut store = LayeredTileStore::new();
        for id in &ids {
            store.place(TileInstance::at(pos, *id));
        }

        let painted = store.objects_at(pos);
        prop_assert_eq!(painted.len(), ids.len() + 1);
        prop_assert!(painted[0].is(ids::EMPTY_FLOOR));

        let z: Vec<i32> = painted.iter().map(|t| t.definition().layer.z_index()).collect();
        prop_assert!(z.windows(2).all(|pair| pair[0] <= pair[1]));

        for layer in LogicalLayer::STACKED {
            let expected: Vec<&str> = ids
                .iter()
                .copied()
                .filter(|id| registry().get(id).layer == layer)
                .collect();
            let actual: Vec<&str> = painted
                .iter()
                .filter(|t| t.definition().layer == layer)
                .map(|t| t.definition_id.as_str())
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn prop_scenery_rebuilds_same_cells(tiles in prop::collection::vec(instance(any_id()), 0..40)) {
        let store: LayeredTileStore = tiles.into_iter().collect();
        let rebuilt: LayeredTileStore = store.to_scenery().into_iter().collect();
        prop_assert_eq!(visible(&rebuilt), visible(&store));
    }
}
