//! # Game State Module
//!
//! The world model a running game scene owns: player, tile store, camera,
//! dirty-tile bookkeeping, timers and editor state.
//!
//! The engine and the action dispatcher are the only writers, and both run on
//! the render thread, so nothing here is synchronized.

use crate::constants::{DEBUG_WALK_SPEED, RESPAWN_TICKS};
use crate::game::player::Player;
use crate::game::store::{LayeredTileStore, TileInstance};
use crate::game::tiles::ids;
use crate::game::Position;
use log::debug;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Debug switches consulted by movement and the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugFlags {
    /// Walk through blocking tiles
    pub ignore_collisions: bool,
    /// One-cell steps performed per move action
    pub walk_speed_multiplier: u32,
}

impl Default for DebugFlags {
    fn default() -> Self {
        Self {
            ignore_collisions: false,
            walk_speed_multiplier: 1,
        }
    }
}

impl DebugFlags {
    /// Flips between normal play and the debug walk. Returns whether debug is now on.
    pub fn toggle(&mut self) -> bool {
        self.ignore_collisions = !self.ignore_collisions;
        self.walk_speed_multiplier = if self.ignore_collisions {
            DEBUG_WALK_SPEED
        } else {
            1
        };
        self.ignore_collisions
    }
}

/// Which front the game scene is presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Play,
    Editor,
}

/// Mode flags set at scene entry and consulted every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameContext {
    pub mode: GameMode,
    pub enable_editor_commands: bool,
    pub enable_sliding: bool,
    pub enable_respawn: bool,
}

impl Default for GameContext {
    fn default() -> Self {
        Self::play()
    }
}

impl GameContext {
    /// Play mode with sliding and respawning on.
    pub fn play() -> Self {
        Self {
            mode: GameMode::Play,
            enable_editor_commands: false,
            enable_sliding: true,
            enable_respawn: true,
        }
    }

    /// Editor mode.
    pub fn editor() -> Self {
        Self {
            mode: GameMode::Editor,
            enable_editor_commands: true,
            ..Self::play()
        }
    }

    /// Swaps between play and editor. Returns whether the editor is now active.
    pub fn toggle_editor(&mut self) -> bool {
        let entering = self.mode == GameMode::Play;
        self.mode = if entering {
            GameMode::Editor
        } else {
            GameMode::Play
        };
        self.enable_editor_commands = entering;
        entering
    }

    pub fn is_play(&self) -> bool {
        self.mode == GameMode::Play
    }

    pub fn is_editor(&self) -> bool {
        self.mode == GameMode::Editor
    }
}

/// Tile instances waiting to be placed back after a countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespawnEntry {
    pub countdown_ticks: u32,
    pub items: Vec<TileInstance>,
}

impl RespawnEntry {
    /// Entry with the standard respawn delay.
    pub fn new(items: Vec<TileInstance>) -> Self {
        Self {
            countdown_ticks: RESPAWN_TICKS,
            items,
        }
    }
}

/// One reversible editor operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoEntry {
    Added(Vec<TileInstance>),
    Removed(Vec<TileInstance>),
}

/// Short highlight on the cell the player just interacted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionFlash {
    pub position: Position,
    pub ticks: u32,
}

/// Everything a running game scene owns.
#[derive(Debug, Clone)]
pub struct GameModel {
    pub player: Player,
    pub store: LayeredTileStore,
    /// World coordinate shown at the top-left of the map view
    pub camera: Position,
    /// Cells to repaint on the next frame
    pub dirty: HashSet<Position>,
    pub full_redraw: bool,
    pub respawn_queue: Vec<RespawnEntry>,
    pub action_flash: Option<ActionFlash>,
    pub editor_palette: Vec<String>,
    pub editor_index: usize,
    pub editor_undo: Vec<UndoEntry>,
    /// File name the map was loaded from, if any
    pub loaded_map_name: Option<String>,
    pub should_quit: bool,
    /// Camera movement since the last rendered frame
    pub scroll_delta: Position,
    pub context: GameContext,
    pub debug: DebugFlags,
    /// Advisory dimensions, used for saving and centering only
    pub world_width: i32,
    pub world_height: i32,
    /// Unknown top-level keys of the loaded map file
    pub extras: Map<String, Value>,
    /// Whether the map came from the generator rather than a file
    pub generated: bool,
    /// Answer already given to "save generated map?" while quitting
    pub save_on_exit: Option<bool>,
}

impl GameModel {
    /// Binds a player and a store into a fresh model.
    pub fn new(player: Player, store: LayeredTileStore, world_width: i32, world_height: i32) -> Self {
        Self {
            player,
            store,
            camera: Position::origin(),
            dirty: HashSet::new(),
            full_redraw: true,
            respawn_queue: Vec::new(),
            action_flash: None,
            editor_palette: Vec::new(),
            editor_index: 0,
            editor_undo: Vec::new(),
            loaded_map_name: None,
            should_quit: false,
            scroll_delta: Position::origin(),
            context: GameContext::play(),
            debug: DebugFlags::default(),
            world_width,
            world_height,
            extras: Map::new(),
            generated: false,
            save_on_exit: None,
        }
    }

    /// Flags a cell for repaint.
    pub fn mark_dirty(&mut self, position: Position) {
        self.dirty.insert(position);
    }

    /// Flags the whole view for repaint.
    pub fn request_full_redraw(&mut self) {
        self.full_redraw = true;
    }

    /// Definition id currently selected in the editor palette.
    pub fn palette_selection(&self) -> Option<&str> {
        self.editor_palette
            .get(self.editor_index)
            .map(String::as_str)
    }

    /// Puts the player in the middle of a view of the given size.
    pub fn center_camera(&mut self, (width, height): (i32, i32)) {
        self.camera = Position::new(self.player.x - width / 2, self.player.y - height / 2);
    }

    /// Scrolls the camera so the player stays out of the dead zone.
    ///
    /// Records the movement in `scroll_delta` and asks for a full redraw when
    /// the camera jumped more than one cell on either axis. The world is not
    /// clamped.
    pub fn update_camera(&mut self, (width, height): (i32, i32), dead_zone: i32) -> Position {
        let before = self.camera;
        let screen_x = self.player.x - self.camera.x;
        let screen_y = self.player.y - self.camera.y;

        if screen_x < dead_zone {
            self.camera.x -= dead_zone - screen_x;
        } else if screen_x > width - dead_zone - 1 {
            self.camera.x += screen_x - (width - dead_zone - 1);
        }
        if screen_y < dead_zone {
            self.camera.y -= dead_zone - screen_y;
        } else if screen_y > height - dead_zone - 1 {
            self.camera.y += screen_y - (height - dead_zone - 1);
        }

        let delta = self.camera - before;
        self.scroll_delta = self.scroll_delta + delta;
        if delta.x.abs() > 1 || delta.y.abs() > 1 {
            self.full_redraw = true;
        }
        delta
    }

    /// Advances timers by one world tick.
    ///
    /// Respawns count down while respawning is enabled; sliding on a path
    /// happens in play mode only when no action arrived this frame; the
    /// action flash fades last.
    pub fn tick_world(&mut self, had_actions: bool) {
        if self.context.enable_respawn {
            self.tick_respawns();
        }
        if self.context.is_play() && self.context.enable_sliding && !had_actions {
            self.slide();
        }
        self.tick_action_flash();
    }

    fn tick_respawns(&mut self) {
        for entry in &mut self.respawn_queue {
            entry.countdown_ticks = entry.countdown_ticks.saturating_sub(1);
        }
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.respawn_queue)
            .into_iter()
            .partition(|entry| entry.countdown_ticks == 0);
        self.respawn_queue = waiting;

        for entry in ready {
            for item in entry.items {
                debug!("Respawning {} at ({}, {})", item.definition_id, item.x, item.y);
                self.mark_dirty(item.position());
                self.store.place(item);
            }
        }
    }

    fn slide(&mut self) {
        let on_path = self
            .store
            .floor_at(self.player.position())
            .is_some_and(|floor| floor.is(ids::PATH));
        if !on_path {
            return;
        }
        let from = self.player.position();
        if self.player.step(self.player.facing, &self.store, &self.debug) {
            self.mark_dirty(from);
            self.mark_dirty(self.player.position());
        }
    }

    fn tick_action_flash(&mut self) {
        if let Some(flash) = self.action_flash.as_mut() {
            flash.ticks = flash.ticks.saturating_sub(1);
            if flash.ticks == 0 {
                let position = flash.position;
                self.action_flash = None;
                self.mark_dirty(position);
            }
        }
    }
}
