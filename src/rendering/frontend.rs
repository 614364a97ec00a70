//! # Frontend
//!
//! The [`Renderer`] and [`InputSource`] every part of the game talks to,
//! generic over the [`Backend`] that owns the actual device.
//!
//! Modal screens (menus, the inventory, prompts) draw over the back buffer
//! and block on the backend for keys. After any of them the game view is
//! marked stale so the next game frame repaints it in full.

use crate::config::GameSettings;
use crate::constants::INPUT_BATCH;
use crate::game::GameModel;
use crate::input::{InputSource, Key};
use crate::rendering::{
    map_view_size, paint_frame, Backend, ColorTable, HeadlessBackend, Renderer, Style, Surface, TerminalBackend,
};
use crate::scenes::{EffectRegistry, InventoryScene, MenuState, Modal, Scene, SceneContext};
use crate::storage::{quick_save, MapDirectory};
use crate::TerraResult;
use log::{debug, info, warn};
use std::time::Duration;

/// Frontend drawing to a real terminal.
pub type TerminalFrontend = Frontend<TerminalBackend>;

/// Frontend drawing to memory and reading keys from a script.
pub type HeadlessFrontend = Frontend<HeadlessBackend>;

/// Renderer and input source over a [`Backend`].
#[derive(Debug)]
pub struct Frontend<B: Backend> {
    backend: B,
    colors: ColorTable,
    effects: EffectRegistry,
    maps: MapDirectory,
    frame: u64,
    frame_duration: Duration,
    /// Set once a modal has drawn over the game view
    stale: bool,
}

impl<B: Backend> Frontend<B> {
    pub fn new(backend: B, settings: &GameSettings) -> Self {
        let mut frontend = Self {
            backend,
            colors: ColorTable::default(),
            effects: EffectRegistry::default(),
            maps: MapDirectory::default(),
            frame: 0,
            frame_duration: Duration::ZERO,
            stale: true,
        };
        frontend.apply_settings(settings);
        frontend
    }

    /// Rebuilds theme, weather and map directory from `settings`.
    pub fn apply_settings(&mut self, settings: &GameSettings) {
        self.colors = ColorTable::for_theme(settings.theme);
        self.effects = EffectRegistry::from_weather(settings.weather, settings.seed.unwrap_or(0));
        self.maps = MapDirectory::new(&settings.maps_dir);
        self.frame_duration = match settings.target_fps {
            0 => Duration::ZERO,
            fps => Duration::from_secs(1) / fps,
        };
        self.stale = true;
        debug!(
            "Frontend settings: theme {}, weather {}, {} effect layers",
            settings.theme.name(),
            settings.weather.name(),
            self.effects.len()
        );
    }

    /// Replaces the color table; the game view repaints in the new colors.
    pub fn set_colors(&mut self, colors: ColorTable) {
        self.colors = colors;
        self.stale = true;
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn maps(&self) -> &MapDirectory {
        &self.maps
    }

    pub fn effects_mut(&mut self) -> &mut EffectRegistry {
        &mut self.effects
    }

    /// Frames drawn by modal screens so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The back buffer as plain text.
    pub fn screen_text(&self) -> String {
        self.backend.buffer().to_text()
    }

    /// Drives a modal screen until it produces an outcome.
    pub fn run_modal<M: Modal>(&mut self, modal: &mut M) -> TerraResult<M::Outcome> {
        let outcome = loop {
            self.frame += 1;
            if let Some(outcome) = modal.advance(self.frame) {
                break outcome;
            }
            let (scene, menu) = modal.scene();
            self.render_scene(scene, self.frame, menu)?;

            if modal.accepts_input() {
                let key = self.backend.read_key()?;
                if let Some(outcome) = modal.handle_key(key) {
                    break outcome;
                }
            } else {
                self.backend.pace(self.frame_duration);
            }
        };
        self.stale = true;
        Ok(outcome)
    }

    fn show_dialog(&mut self, lines: &[String]) -> TerraResult<()> {
        let frame_style = self.colors.style("highlight", "black");
        let text_style = self.colors.text("white");
        let surface = self.backend.buffer_mut();
        draw_dialog(surface, lines, frame_style, text_style);
        self.backend.present()
    }
}

/// Centred box holding `lines`, drawn over whatever is on the surface.
pub fn draw_dialog(surface: &mut dyn Surface, lines: &[String], frame: Style, text: Style) {
    let (cols, rows) = surface.size();
    let inner = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0) as i32 + 2;
    let width = inner + 2;
    let height = lines.len() as i32 + 2;
    let left = ((cols - width) / 2).max(0);
    let top = ((rows - height) / 2).max(0);

    for row in top..top + height {
        for col in left..left + width {
            let edge_row = row == top || row == top + height - 1;
            let edge_col = col == left || col == left + width - 1;
            let ch = match (edge_row, edge_col) {
                (true, true) => '+',
                (true, false) => '-',
                (false, true) => '|',
                (false, false) => ' ',
            };
            let style = if ch == ' ' { text } else { frame };
            surface.set_cell(col, row, ch, style);
        }
    }
    for (offset, line) in lines.iter().enumerate() {
        for (index, ch) in line.chars().enumerate() {
            surface.set_cell(left + 2 + index as i32, top + 1 + offset as i32, ch, text);
        }
    }
}

impl<B: Backend> InputSource for Frontend<B> {
    fn poll_keys(&mut self) -> TerraResult<Vec<Key>> {
        self.backend.pending_keys(INPUT_BATCH)
    }
}

impl<B: Backend> Renderer for Frontend<B> {
    fn visible_size(&self) -> (i32, i32) {
        map_view_size(self.backend.buffer().size())
    }

    fn render_scene(&mut self, scene: &mut Scene, frame: u64, menu: Option<&MenuState>) -> TerraResult<()> {
        self.backend.refresh_size()?;
        let ctx = SceneContext {
            colors: &self.colors,
            menu,
        };
        let surface = self.backend.buffer_mut();
        surface.clear(ctx.colors.background("black"));
        for layer in scene.layers_with(self.effects.layers_mut()) {
            layer.draw(surface, frame, &ctx);
        }
        self.backend.present()
    }

    fn render_frame(&mut self, model: &mut GameModel) -> TerraResult<()> {
        if self.backend.refresh_size()? || self.stale {
            model.request_full_redraw();
            self.stale = false;
        }
        let painted = paint_frame(self.backend.buffer_mut(), model, &self.colors);
        if painted > 0 {
            debug!("Repainted {} cells", painted);
        }
        self.backend.present()
    }

    fn prompt_yes_no(&mut self, prompt: &str) -> bool {
        self.stale = true;
        if let Err(err) = self.show_dialog(&[format!("{} (y/n)", prompt)]) {
            warn!("Could not draw prompt: {}", err);
            return false;
        }
        let answer = matches!(self.backend.read_key(), Ok(Key::Char('y' | 'Y')));
        info!("{} -> {}", prompt, if answer { "yes" } else { "no" });
        answer
    }

    fn prompt_text(&mut self, prompt: &str) -> Option<String> {
        self.stale = true;
        let mut input = String::new();
        loop {
            let lines = [prompt.to_string(), format!("> {}_", input)];
            if let Err(err) = self.show_dialog(&lines) {
                warn!("Could not draw prompt: {}", err);
                return None;
            }
            match self.backend.read_key() {
                Ok(Key::Enter) => break,
                Ok(Key::Backspace) => {
                    input.pop();
                }
                Ok(Key::Char(ch)) if !ch.is_control() => input.push(ch),
                Ok(Key::Escape) => return None,
                Ok(_) => {}
                Err(err) => {
                    warn!("Input failed during prompt: {}", err);
                    return None;
                }
            }
        }
        let input = input.trim();
        (!input.is_empty()).then(|| input.to_string())
    }

    fn quick_save(&mut self, model: &mut GameModel) {
        if !quick_save(&self.maps, model) {
            warn!("Quick save failed");
        }
    }

    fn show_inventory(&mut self, model: &mut GameModel) {
        let mut screen = InventoryScene::new(&mut model.player);
        if let Err(err) = self.run_modal(&mut screen) {
            warn!("Inventory screen failed: {}", err);
        }
        model.request_full_redraw();
    }

    fn colors(&self) -> &ColorTable {
        &self.colors
    }
}
