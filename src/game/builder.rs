//! # Model Builder
//!
//! Turns a raw map document and an optional saved player into a ready-to-run
//! [`GameModel`].

use crate::game::player::{Player, PlayerRecord};
use crate::game::state::GameModel;
use crate::game::store::{LayeredTileStore, TileSource};
use crate::game::Position;
use crate::storage::{normalize_map_name, MapDirectory, MapFile};
use log::{debug, info};
use std::collections::{HashSet, VecDeque};

/// Builds a model from a map document.
///
/// The player comes from `record` when given, otherwise a fresh one. It is
/// placed at the map's stored coordinates when present, otherwise on the
/// unblocked cell nearest to the map centre.
pub fn build_model(map: MapFile, record: Option<PlayerRecord>) -> GameModel {
    let store = LayeredTileStore::ensure_layered(TileSource::Flat(map.scenery));
    let mut player = record.map(Player::from_record).unwrap_or_default();

    let spawn = map
        .player_x
        .zip(map.player_y)
        .map(|(x, y)| Position::new(x, y))
        .unwrap_or_else(|| find_spawn(&store, map.world_width, map.world_height));
    player.set_position(spawn);
    debug!("Player spawns at ({}, {})", spawn.x, spawn.y);

    let mut model = GameModel::new(player, store, map.world_width, map.world_height);
    model.extras = map.extras;
    model
}

/// Builds a model for a map that does not come from a file.
pub fn build_generated(map: MapFile, record: Option<PlayerRecord>) -> GameModel {
    let mut model = build_model(map, record);
    model.generated = true;
    model
}

/// Loads `name` from `maps` and builds a model bound to that file.
///
/// Returns `None` when the file is missing or unreadable; no model is built.
pub fn build_from_file(maps: &MapDirectory, name: &str, record: Option<PlayerRecord>) -> Option<GameModel> {
    let map = maps.load(name)?;
    let mut model = build_model(map, record);
    model.loaded_map_name = Some(normalize_map_name(name));
    info!("Built model from {}", name);
    Some(model)
}

/// Breadth-first search outward from the map centre for an unblocked cell.
///
/// Falls back to the centre itself when every cell in bounds is blocked.
pub fn find_spawn(store: &LayeredTileStore, width: i32, height: i32) -> Position {
    let center = Position::new(width / 2, height / 2);
    let in_bounds = |p: Position| p.x >= 0 && p.y >= 0 && p.x < width && p.y < height;

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(center);
    queue.push_back(center);

    while let Some(position) = queue.pop_front() {
        if !store.is_blocked(position) {
            return position;
        }
        for adjacent in position.cardinal_adjacent_positions() {
            if in_bounds(adjacent) && visited.insert(adjacent) {
                queue.push_back(adjacent);
            }
        }
    }
    center
}
