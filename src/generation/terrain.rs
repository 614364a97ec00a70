//! # Terrain Generator
//!
//! Builds an outdoor map in stages: rivers crossing the world, grass grown
//! outward from the river banks, a distance-based floor fill, then trees and
//! rock clusters. The result is a flat scenery list ready to be saved or
//! turned into a tile store.

use crate::game::store::TileInstance;
use crate::game::tiles::{ids, registry, LogicalLayer};
use crate::game::Position;
use crate::generation::{GenerationConfig, Generator};
use crate::storage::MapFile;
use crate::{TerraError, TerraResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Floor cells this close to grass get the sparse-vegetation floor.
const VEGETATION_RANGE: u32 = 5;

/// Chance that a river segment is a three-cell diagonal step.
const DIAGONAL_CHANCE: f64 = 0.3;

/// Procedural outdoor map generator.
#[derive(Debug, Clone, Default)]
pub struct TerrainGenerator;

impl TerrainGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator<MapFile> for TerrainGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> TerraResult<MapFile> {
        if config.width <= 0 || config.height <= 0 {
            return Err(TerraError::GenerationFailed(format!(
                "world size must be positive, got {}x{}",
                config.width, config.height
            )));
        }

        let mut grid = Grid::new(config.width, config.height);
        if config.rivers {
            carve_rivers(&mut grid, rng);
        }
        if config.grass {
            grow_grass(&mut grid, config, rng);
        }
        let distance = grass_distance(&grid);
        fill_floor(&mut grid, &distance, config.debug);

        let mut objects = Vec::new();
        if config.trees {
            plant_trees(&grid, &distance, config, rng, &mut objects);
        }
        if config.rocks {
            scatter_rocks(&grid, config, rng, &mut objects);
        }

        let mut scenery = grid.into_scenery();
        scenery.extend(objects);
        info!(
            "Generated {}x{} terrain with {} scenery entries (seed {})",
            config.width,
            config.height,
            scenery.len(),
            config.seed
        );
        Ok(MapFile::new(config.width, config.height, scenery))
    }

    fn validate(&self, content: &MapFile, config: &GenerationConfig) -> TerraResult<()> {
        let floors = content
            .scenery
            .iter()
            .filter(|entry| entry.definition().layer == LogicalLayer::Floor)
            .count();
        let expected = (config.width * config.height) as usize;
        if floors != expected {
            return Err(TerraError::GenerationFailed(format!(
                "expected {} floor cells, generated {}",
                expected, floors
            )));
        }
        Ok(())
    }
}

/// Generates a map from `config` with a generator seeded from `config.seed`.
///
/// # Examples
///
/// ```
/// use terratile::{generate_terrain, GenerationConfig};
///
/// let a = generate_terrain(&GenerationConfig::for_testing(3)).unwrap();
/// let b = generate_terrain(&GenerationConfig::for_testing(3)).unwrap();
/// assert_eq!(a.scenery, b.scenery);
/// ```
pub fn generate_terrain(config: &GenerationConfig) -> TerraResult<MapFile> {
    TerrainGenerator::new().generate_seeded(config)
}

/// Dense `height x width` grid of floor ids; `None` is still unassigned.
struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Option<&'static str>>,
}

impl Grid {
    fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    fn contains(&self, position: Position) -> bool {
        position.x >= 0 && position.y >= 0 && position.x < self.width && position.y < self.height
    }

    fn index(&self, position: Position) -> usize {
        (position.y * self.width + position.x) as usize
    }

    fn get(&self, position: Position) -> Option<&'static str> {
        if self.contains(position) {
            self.cells[self.index(position)]
        } else {
            None
        }
    }

    fn set(&mut self, position: Position, id: &'static str) {
        if self.contains(position) {
            let index = self.index(position);
            self.cells[index] = Some(id);
        }
    }

    fn is(&self, position: Position, id: &str) -> bool {
        self.get(position) == Some(id)
    }

    /// Row-major positions.
    fn positions(&self) -> impl Iterator<Item = Position> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    fn positions_of(&self, id: &str) -> Vec<Position> {
        self.positions().filter(|&position| self.is(position, id)).collect()
    }

    fn into_scenery(self) -> Vec<TileInstance> {
        let registry = registry();
        self.positions()
            .map(|position| {
                let id = self.get(position).unwrap_or(ids::EMPTY_FLOOR);
                TileInstance::at(position, registry.resolve_id(id))
            })
            .collect()
    }
}

fn carve_rivers(grid: &mut Grid, rng: &mut StdRng) {
    let count = rng.gen_range(1..=2);
    for _ in 0..count {
        let path = trace_river(grid, rng);
        debug!("River with {} path cells", path.len());
        for (index, &cell) in path.iter().enumerate() {
            grid.set(cell, ids::RIVER);
            if index % 2 == 0 {
                for neighbor in cell.adjacent_positions() {
                    grid.set(neighbor, ids::RIVER);
                }
            }
        }
    }
}

/// Picks two opposite edges and walks from one to the other.
fn trace_river(grid: &Grid, rng: &mut StdRng) -> Vec<Position> {
    let (w, h) = (grid.width, grid.height);
    let (start, end) = match rng.gen_range(0..4) {
        0 => (Position::new(0, rng.gen_range(0..h)), Position::new(w - 1, rng.gen_range(0..h))),
        1 => (Position::new(w - 1, rng.gen_range(0..h)), Position::new(0, rng.gen_range(0..h))),
        2 => (Position::new(rng.gen_range(0..w), 0), Position::new(rng.gen_range(0..w), h - 1)),
        _ => (Position::new(rng.gen_range(0..w), h - 1), Position::new(rng.gen_range(0..w), 0)),
    };

    let mut path = vec![start];
    let mut current = start;
    let max_steps = (w + h) as usize * 4;
    while chebyshev(current, end) > 1 && path.len() < max_steps {
        let diff = end - current;
        let major_is_x = diff.x.abs() >= diff.y.abs();
        let toward_major = if major_is_x {
            Position::new(diff.x.signum(), 0)
        } else {
            Position::new(0, diff.y.signum())
        };

        let steps: Vec<Position> = if rng.gen_bool(DIAGONAL_CHANCE) {
            let minor_diff = if major_is_x { diff.y } else { diff.x };
            let mut sign = minor_diff.signum();
            if sign == 0 {
                sign = if rng.gen_bool(0.5) { 1 } else { -1 };
            }
            let mut toward_minor = if major_is_x {
                Position::new(0, sign)
            } else {
                Position::new(sign, 0)
            };
            if !grid.contains(current + toward_major + toward_minor) {
                toward_minor = Position::origin() - toward_minor;
            }
            vec![toward_major, toward_minor, toward_major]
        } else {
            vec![toward_major; rng.gen_range(1..=2)]
        };

        for step in steps {
            let next = current + step;
            if chebyshev(current, end) <= 1 || !grid.contains(next) || step == Position::origin() {
                continue;
            }
            current = next;
            path.push(current);
        }
    }
    if current != end {
        path.push(end);
    }
    path
}

fn chebyshev(a: Position, b: Position) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

fn grow_grass(grid: &mut Grid, config: &GenerationConfig, rng: &mut StdRng) {
    let rivers = grid.positions_of(ids::RIVER);
    if rivers.is_empty() {
        debug!("No river to grow grass from");
        return;
    }

    let radius = (config.patch_size as f64).sqrt().ceil() + 8.0;
    for _ in 0..config.grass_bundles {
        let center = rivers[rng.gen_range(0..rivers.len())];
        let orientation = rng.gen_range(0.0..TAU);
        let mut placed = 0;
        let mut attempts = 0;
        while placed < config.patch_size && attempts < config.patch_size * 10 {
            attempts += 1;
            let angle = orientation + rng.gen_range(-FRAC_PI_2..=FRAC_PI_2);
            let distance = rng.gen_range(0.0..=radius);
            let cell = Position::new(
                center.x + (distance * angle.cos()).round() as i32,
                center.y + (distance * angle.sin()).round() as i32,
            );
            if grid.contains(cell) && grid.get(cell).is_none() {
                grid.set(cell, ids::GRASS);
                placed += 1;
            }
        }
    }
}

/// Multi-source BFS distance (in steps) from the nearest grass cell.
/// Cells with no grass anywhere get `u32::MAX`.
fn grass_distance(grid: &Grid) -> Vec<u32> {
    let mut distance = vec![u32::MAX; grid.cells.len()];
    let mut queue = VecDeque::new();
    for position in grid.positions_of(ids::GRASS) {
        distance[grid.index(position)] = 0;
        queue.push_back(position);
    }

    while let Some(position) = queue.pop_front() {
        let next = distance[grid.index(position)] + 1;
        for neighbor in position.cardinal_adjacent_positions() {
            if !grid.contains(neighbor) {
                continue;
            }
            let index = grid.index(neighbor);
            if distance[index] == u32::MAX {
                distance[index] = next;
                queue.push_back(neighbor);
            }
        }
    }
    distance
}

fn fill_floor(grid: &mut Grid, distance: &[u32], debug: bool) {
    for position in grid.positions().collect::<Vec<_>>() {
        if grid.get(position).is_some() {
            continue;
        }
        let id = if distance[grid.index(position)] <= VEGETATION_RANGE {
            ids::SEMICOLON_FLOOR
        } else if debug {
            ids::DEBUG_DOT
        } else {
            ids::EMPTY_FLOOR
        };
        grid.set(position, id);
    }
}

fn plant_trees(
    grid: &Grid,
    distance: &[u32],
    config: &GenerationConfig,
    rng: &mut StdRng,
    objects: &mut Vec<TileInstance>,
) {
    let mut candidates: Vec<Position> = grid
        .positions()
        .filter(|&position| {
            !grid.is(position, ids::GRASS)
                && !grid.is(position, ids::RIVER)
                && distance[grid.index(position)] >= 2
        })
        .collect();
    let mut valid: HashSet<Position> = candidates.iter().copied().collect();
    let mut trunks: Vec<Position> = Vec::new();

    let target = rng.gen_range(config.tree_min..=config.tree_max.max(config.tree_min));
    while (trunks.len() as u32) < target && !candidates.is_empty() {
        let trunk = candidates.swap_remove(rng.gen_range(0..candidates.len()));
        let top = Position::new(trunk.x, trunk.y - 1);
        if !valid.contains(&trunk) || !valid.contains(&top) {
            continue;
        }
        if trunks.iter().any(|other| other.manhattan_distance(trunk) <= 1) {
            continue;
        }

        objects.push(TileInstance::at(trunk, ids::TREE_TRUNK));
        objects.push(TileInstance::at(top, ids::TREE_TOP));
        trunks.push(trunk);
        valid.remove(&trunk);
        for neighbor in trunk.adjacent_positions() {
            valid.remove(&neighbor);
        }
    }
    debug!("Planted {} of {} trees", trunks.len(), target);
}

fn scatter_rocks(grid: &Grid, config: &GenerationConfig, rng: &mut StdRng, objects: &mut Vec<TileInstance>) {
    let grass = grid.positions_of(ids::GRASS);
    if grass.is_empty() {
        return;
    }

    let mut rocks: HashSet<Position> = HashSet::new();
    let clusters = rng.gen_range(config.rock_min..=config.rock_max.max(config.rock_min));
    for _ in 0..clusters {
        let center = grass[rng.gen_range(0..grass.len())];
        let size = rng.gen_range(1..=3);
        for _ in 0..size {
            let cell = center + Position::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1));
            if grid.is(cell, ids::GRASS) && rocks.insert(cell) {
                objects.push(TileInstance::at(cell, ids::ROCK));
            }
        }
    }
    debug!("Scattered {} rocks in {} clusters", rocks.len(), clusters);
}
