//! # Storage Module
//!
//! Map files, the map directory and the player file.
//!
//! Everything here is best effort: loaders return `None` and writers return
//! `false` on failure, logging the cause. Writes go through a temporary file
//! and a rename so a crash never leaves a half-written document behind.

pub mod save_flow;

pub use save_flow::*;

use crate::constants::{CHARACTER_FILE, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH, MAPS_DIR};
use crate::game::player::PlayerRecord;
use crate::game::store::TileInstance;
use crate::game::Position;
use crate::{TerraError, TerraResult};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

const MAP_SUFFIX: &str = ".json";

fn default_width() -> i32 {
    DEFAULT_WORLD_WIDTH
}

fn default_height() -> i32 {
    DEFAULT_WORLD_HEIGHT
}

/// A map document as stored on disk.
///
/// Unknown top-level keys are kept in `extras` when loading; they are never
/// written back.
///
/// # Examples
///
/// ```
/// use terratile::MapFile;
///
/// let map = MapFile::from_json(r#"{"scenery": [], "author": "me"}"#).unwrap();
/// assert_eq!((map.world_width, map.world_height), (100, 60));
/// assert!(map.extras.contains_key("author"));
/// assert!(!map.to_json().unwrap().contains("author"));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapFile {
    #[serde(default = "default_width")]
    pub world_width: i32,
    #[serde(default = "default_height")]
    pub world_height: i32,
    #[serde(default)]
    pub scenery: Vec<TileInstance>,
    #[serde(default)]
    pub player_x: Option<i32>,
    #[serde(default)]
    pub player_y: Option<i32>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

/// Borrowed view holding only the keys a map file is written with.
#[derive(Serialize)]
struct MapFileOut<'a> {
    world_width: i32,
    world_height: i32,
    scenery: &'a [TileInstance],
    #[serde(skip_serializing_if = "Option::is_none")]
    player_x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    player_y: Option<i32>,
}

impl Default for MapFile {
    fn default() -> Self {
        Self::new(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT, Vec::new())
    }
}

impl MapFile {
    pub fn new(world_width: i32, world_height: i32, scenery: Vec<TileInstance>) -> Self {
        Self {
            world_width,
            world_height,
            scenery,
            player_x: None,
            player_y: None,
            extras: Map::new(),
        }
    }

    pub fn from_json(text: &str) -> TerraResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty JSON with the known keys only.
    pub fn to_json(&self) -> TerraResult<String> {
        Ok(serde_json::to_string_pretty(&self.view())?)
    }

    fn view(&self) -> MapFileOut<'_> {
        MapFileOut {
            world_width: self.world_width,
            world_height: self.world_height,
            scenery: &self.scenery,
            player_x: self.player_x,
            player_y: self.player_y,
        }
    }

    /// Stored player coordinates, when both are present.
    pub fn player_position(&self) -> Option<Position> {
        Some(Position::new(self.player_x?, self.player_y?))
    }

    pub fn set_player_position(&mut self, position: Position) {
        self.player_x = Some(position.x);
        self.player_y = Some(position.y);
    }
}

/// Appends `.json` unless the name already ends with it.
///
/// # Examples
///
/// ```
/// use terratile::normalize_map_name;
///
/// assert_eq!(normalize_map_name(" island "), "island.json");
/// assert_eq!(normalize_map_name("island.json"), "island.json");
/// ```
pub fn normalize_map_name(name: &str) -> String {
    let name = name.trim();
    if name.ends_with(MAP_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, MAP_SUFFIX)
    }
}

/// Serializes `value` next to `path` and renames it into place.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> TerraResult<()> {
    write_text_atomic(path, &serde_json::to_string_pretty(value)?)
}

fn write_text_atomic(path: &Path, text: &str) -> TerraResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Directory of map files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDirectory {
    root: PathBuf,
}

impl Default for MapDirectory {
    fn default() -> Self {
        Self::new(MAPS_DIR)
    }
}

impl MapDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a map, with `.json` appended when missing.
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.root.join(normalize_map_name(name))
    }

    /// Names of the `.json` files in the directory, sorted. Creates the
    /// directory when it does not exist.
    pub fn list(&self) -> Vec<String> {
        match self.try_list() {
            Ok(names) => names,
            Err(err) => {
                warn!("Could not list maps in {}: {}", self.root.display(), err);
                Vec::new()
            }
        }
    }

    fn try_list(&self) -> TerraResult<Vec<String>> {
        fs::create_dir_all(&self.root)?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(MAP_SUFFIX) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.file_path(name).is_file()
    }

    /// Reads and parses a map. Missing or malformed files yield an error.
    pub fn try_load(&self, name: &str) -> TerraResult<MapFile> {
        let path = self.file_path(name);
        if !path.is_file() {
            return Err(TerraError::Storage(format!("no map at {}", path.display())));
        }
        MapFile::from_json(&fs::read_to_string(&path)?)
    }

    /// Reads a map, logging and returning `None` on any failure.
    pub fn load(&self, name: &str) -> Option<MapFile> {
        match self.try_load(name) {
            Ok(map) => {
                info!("Loaded map {} ({} scenery entries)", name, map.scenery.len());
                Some(map)
            }
            Err(err) => {
                warn!("Could not load map {}: {}", name, err);
                None
            }
        }
    }

    /// Writes a map, known keys only. Returns whether it was written.
    pub fn save(&self, name: &str, map: &MapFile) -> bool {
        let path = self.file_path(name);
        match map.to_json().and_then(|text| write_text_atomic(&path, &text)) {
            Ok(()) => {
                info!("Saved map to {}", path.display());
                true
            }
            Err(err) => {
                warn!("Could not save map {}: {}", path.display(), err);
                false
            }
        }
    }

    /// Deletes a map. Returns false when it was missing or could not be removed.
    pub fn delete(&self, name: &str) -> bool {
        let path = self.file_path(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted map {}", path.display());
                true
            }
            Err(err) => {
                debug!("Could not delete {}: {}", path.display(), err);
                false
            }
        }
    }
}

/// Default location of the player file.
pub fn default_player_path() -> PathBuf {
    PathBuf::from(CHARACTER_FILE)
}

/// Reads the player file. Missing or malformed files yield `None`.
pub fn load_player(path: &Path) -> Option<PlayerRecord> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            debug!("No player file at {}: {}", path.display(), err);
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!("Ignoring malformed player file {}: {}", path.display(), err);
            None
        }
    }
}

/// Writes the player file, replacing any previous one.
pub fn save_player(path: &Path, record: &PlayerRecord) -> bool {
    match write_json_atomic(path, record) {
        Ok(()) => {
            debug!("Saved player to {}", path.display());
            true
        }
        Err(err) => {
            warn!("Could not save player to {}: {}", path.display(), err);
            false
        }
    }
}
