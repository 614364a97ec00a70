//! # Game Module
//!
//! World model, tile storage and the per-frame engine.
//!
//! This module contains the building blocks shared by the play mode and the
//! map editor:
//! - The tile definition registry and the sparse layered tile store
//! - The player, inventory items and movement
//! - The action dispatcher, the placement service and the engine loop

pub mod actions;
pub mod builder;
pub mod engine;
pub mod items;
pub mod placement;
pub mod player;
pub mod state;
pub mod store;
pub mod tiles;

pub use actions::*;
pub use builder::*;
pub use engine::*;
pub use items::*;
pub use placement::*;
pub use player::*;
pub use state::*;
pub use store::*;
pub use tiles::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate in the world.
///
/// The world is unbounded, so coordinates may be negative.
///
/// # Examples
///
/// ```
/// use terratile::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
/// assert_eq!(pos.cardinal_adjacent_positions().len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use terratile::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Returns all 8 adjacent positions (including diagonals).
    pub fn adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x - 1, self.y - 1),
            Position::new(self.x, self.y - 1),
            Position::new(self.x + 1, self.y - 1),
            Position::new(self.x - 1, self.y),
            Position::new(self.x + 1, self.y),
            Position::new(self.x - 1, self.y + 1),
            Position::new(self.x, self.y + 1),
            Position::new(self.x + 1, self.y + 1),
        ]
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x, self.y - 1),
            Position::new(self.x - 1, self.y),
            Position::new(self.x + 1, self.y),
            Position::new(self.x, self.y + 1),
        ]
    }

    /// Returns the neighbouring position one step in `facing`.
    pub fn step(self, facing: Facing) -> Position {
        self + facing.to_delta()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// The four directions the player can face and move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    /// Converts a facing to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use terratile::{Facing, Position};
    ///
    /// assert_eq!(Facing::Up.to_delta(), Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Facing::Up => Position::new(0, -1),
            Facing::Down => Position::new(0, 1),
            Facing::Left => Position::new(-1, 0),
            Facing::Right => Position::new(1, 0),
        }
    }

    /// Converts a position delta to a facing.
    ///
    /// Returns None for diagonal or zero deltas.
    pub fn from_delta(delta: Position) -> Option<Facing> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Facing::Up),
            (0, 1) => Some(Facing::Down),
            (-1, 0) => Some(Facing::Left),
            (1, 0) => Some(Facing::Right),
            _ => None,
        }
    }

    /// Returns all four facings.
    pub fn all() -> [Facing; 4] {
        [Facing::Up, Facing::Down, Facing::Left, Facing::Right]
    }
}
