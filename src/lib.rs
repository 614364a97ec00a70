//! # Terratile
//!
//! A terminal tile RPG with a play mode and an in-place map editor that share
//! one world model.
//!
//! ## Architecture Overview
//!
//! - **Game**: tile registry, the sparse layered tile store, the player, the
//!   action dispatcher and the per-frame engine
//! - **Generation**: the procedural terrain pipeline (rivers, grass, trees, rocks)
//! - **Input**: key codes mapped to high-level actions
//! - **Rendering**: frontend-agnostic renderer contracts, the dirty-tile painter,
//!   a crossterm frontend and a scripted headless frontend
//! - **Scenes**: composable scene layers, global weather effects and the scene
//!   flow state machine
//! - **Storage**: map files, the player file and the post-game save flow
//!
//! Everything runs on one thread; the current game model is owned exclusively
//! by the engine while a game scene is running.

pub mod config;
pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod scenes;
pub mod storage;

pub use config::{GameSettings, Weather};
pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use scenes::*;
pub use storage::*;

/// Core error type for the Terratile engine.
#[derive(thiserror::Error, Debug)]
pub enum TerraError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A map or player file could not be used
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type used throughout the Terratile codebase.
pub type TerraResult<T> = Result<T, TerraError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod constants {
    /// Default world width in tiles
    pub const DEFAULT_WORLD_WIDTH: i32 = 100;

    /// Default world height in tiles
    pub const DEFAULT_WORLD_HEIGHT: i32 = 60;

    /// Frames per second target for the game loop
    pub const TARGET_FPS: u32 = 20;

    /// Inner camera margin, in cells, inside which the player moves without scrolling
    pub const DEAD_ZONE: i32 = 2;

    /// World ticks before a chopped tree or mined rock comes back
    pub const RESPAWN_TICKS: u32 = 50;

    /// Screen rows reserved above the map for the border and HUD
    pub const TOP_OFFSET: i32 = 3;

    /// Width of the frame drawn around the screen
    pub const BORDER: i32 = 1;

    /// Maximum number of keys drained from the input queue per frame
    pub const INPUT_BATCH: usize = 5;

    /// Steps per move while the debug walk speed is active
    pub const DEBUG_WALK_SPEED: u32 = 3;

    /// Default directory holding map files
    pub const MAPS_DIR: &str = "maps";

    /// Default location of the player file
    pub const CHARACTER_FILE: &str = "character/character_data.json";

    /// Default location of the settings file
    pub const SETTINGS_FILE: &str = "settings.json";
}
