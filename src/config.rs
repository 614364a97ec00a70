//! # Settings
//!
//! User settings persisted as JSON next to the game. Missing or malformed
//! files fall back to defaults; every field has its own default so older
//! files keep loading as fields are added.

use crate::constants::{
    CHARACTER_FILE, DEAD_ZONE, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH, MAPS_DIR, TARGET_FPS,
};
use crate::generation::GenerationConfig;
use crate::rendering::Theme;
use crate::storage::write_json_atomic;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Global weather effect drawn over every scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    None,
    Snow,
    Rain,
}

impl Weather {
    /// The next option, wrapping around.
    pub fn next(self) -> Weather {
        match self {
            Weather::None => Weather::Snow,
            Weather::Snow => Weather::Rain,
            Weather::Rain => Weather::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Weather::None => "none",
            Weather::Snow => "snow",
            Weather::Rain => "rain",
        }
    }
}

/// Persisted user settings.
///
/// # Examples
///
/// ```
/// use terratile::GameSettings;
///
/// let settings: GameSettings = serde_json::from_str(r#"{"weather": "snow"}"#).unwrap();
/// assert_eq!(settings.weather.name(), "snow");
/// assert_eq!(settings.dead_zone, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub theme: Theme,
    pub weather: Weather,
    /// Generate rivers in new worlds
    pub rivers: bool,
    pub grass: bool,
    pub trees: bool,
    pub rocks: bool,
    /// Paths keep the player moving while no key is pressed
    pub enable_sliding: bool,
    /// Chopped trees and mined rocks come back after a while
    pub enable_respawn: bool,
    pub dead_zone: i32,
    /// Frames per second; 0 runs frames back to back
    pub target_fps: u32,
    /// Cross-fade between menus and the game
    pub transitions: bool,
    pub maps_dir: PathBuf,
    pub character_path: PathBuf,
    /// Fixed seed for generated worlds; random when unset
    pub seed: Option<u64>,
    pub world_width: i32,
    pub world_height: i32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            weather: Weather::default(),
            rivers: true,
            grass: true,
            trees: true,
            rocks: true,
            enable_sliding: true,
            enable_respawn: true,
            dead_zone: DEAD_ZONE,
            target_fps: TARGET_FPS,
            transitions: true,
            maps_dir: PathBuf::from(MAPS_DIR),
            character_path: PathBuf::from(CHARACTER_FILE),
            seed: None,
            world_width: DEFAULT_WORLD_WIDTH,
            world_height: DEFAULT_WORLD_HEIGHT,
        }
    }
}

impl GameSettings {
    /// Reads settings from `path`, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                debug!("Using default settings, {} unreadable: {}", path.display(), err);
                return Self::default();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|err| {
            warn!("Ignoring malformed settings file {}: {}", path.display(), err);
            Self::default()
        })
    }

    /// Writes settings to `path`. Returns whether they were written.
    pub fn save(&self, path: &Path) -> bool {
        match write_json_atomic(path, self) {
            Ok(()) => true,
            Err(err) => {
                warn!("Could not save settings to {}: {}", path.display(), err);
                false
            }
        }
    }

    /// Generation parameters for a new world with the given seed.
    pub fn generation_config(&self, seed: u64) -> GenerationConfig {
        GenerationConfig {
            rivers: self.rivers,
            grass: self.grass,
            trees: self.trees,
            rocks: self.rocks,
            ..GenerationConfig::new(seed, self.world_width, self.world_height)
        }
    }
}
