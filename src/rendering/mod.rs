//! # Rendering Module
//!
//! Frontend-agnostic drawing contracts and the frontends built on them.
//!
//! Layers and the tile painter draw through [`Surface`]; the engine, the
//! dispatcher and the scene flow talk to a [`Renderer`]. A [`Backend`] is the
//! device underneath (a crossterm terminal or an in-memory buffer fed by a
//! key script).

pub mod buffer;
pub mod frontend;
pub mod headless;
pub mod terminal;
pub mod tile_renderer;

pub use buffer::*;
pub use frontend::*;
pub use headless::*;
pub use terminal::*;
pub use tile_renderer::*;

use crate::constants::{BORDER, TOP_OFFSET};
use crate::game::GameModel;
use crate::input::Key;
use crate::scenes::{MenuState, Scene};
use crate::TerraResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend towards `other`; `t` is clamped to `0.0..=1.0`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Foreground and background of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
}

impl Style {
    pub const fn new(fg: Rgb, bg: Rgb) -> Self {
        Self { fg, bg, bold: false }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0))
    }
}

/// Named color palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Classic,
    Dusk,
}

impl Theme {
    /// The theme after this one, wrapping around.
    pub fn next(self) -> Theme {
        match self {
            Theme::Classic => Theme::Dusk,
            Theme::Dusk => Theme::Classic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Classic => "classic",
            Theme::Dusk => "dusk",
        }
    }
}

const CLASSIC: &[(&str, Rgb)] = &[
    ("white", Rgb::new(230, 230, 230)),
    ("black", Rgb::new(12, 12, 18)),
    ("grey", Rgb::new(128, 128, 128)),
    ("dark_green", Rgb::new(40, 110, 40)),
    ("green", Rgb::new(60, 160, 60)),
    ("bright_green", Rgb::new(120, 220, 90)),
    ("yellow", Rgb::new(240, 210, 80)),
    ("brown", Rgb::new(150, 100, 50)),
    ("bright_blue", Rgb::new(110, 170, 255)),
    ("red", Rgb::new(220, 60, 60)),
    ("grass", Rgb::new(24, 60, 24)),
    ("sand", Rgb::new(90, 80, 40)),
    ("path", Rgb::new(60, 45, 30)),
    ("water", Rgb::new(20, 40, 110)),
    ("flash", Rgb::new(200, 200, 60)),
    ("border", Rgb::new(160, 160, 170)),
    ("hud", Rgb::new(200, 200, 200)),
    ("highlight", Rgb::new(250, 200, 60)),
    ("snow", Rgb::new(240, 240, 255)),
    ("rain", Rgb::new(90, 120, 220)),
];

const DUSK: &[(&str, Rgb)] = &[
    ("white", Rgb::new(210, 200, 220)),
    ("black", Rgb::new(20, 14, 30)),
    ("grey", Rgb::new(110, 100, 120)),
    ("dark_green", Rgb::new(40, 80, 60)),
    ("green", Rgb::new(60, 120, 80)),
    ("bright_green", Rgb::new(110, 180, 110)),
    ("yellow", Rgb::new(230, 170, 90)),
    ("brown", Rgb::new(130, 80, 60)),
    ("bright_blue", Rgb::new(120, 130, 230)),
    ("red", Rgb::new(200, 70, 100)),
    ("grass", Rgb::new(28, 40, 36)),
    ("sand", Rgb::new(70, 55, 50)),
    ("path", Rgb::new(50, 35, 40)),
    ("water", Rgb::new(30, 30, 90)),
    ("flash", Rgb::new(230, 140, 90)),
    ("border", Rgb::new(140, 110, 170)),
    ("hud", Rgb::new(190, 180, 210)),
    ("highlight", Rgb::new(240, 150, 110)),
    ("snow", Rgb::new(220, 220, 250)),
    ("rain", Rgb::new(100, 100, 200)),
];

/// Immutable mapping from color names to RGB values for one theme.
///
/// Switching themes builds a new table; nothing mutates a table in place.
///
/// # Examples
///
/// ```
/// use terratile::{ColorTable, Theme};
///
/// let colors = ColorTable::for_theme(Theme::Classic);
/// let style = colors.style("bright_blue", "water");
/// assert_ne!(style.fg, style.bg);
/// assert_eq!(colors.get("no_such_color"), colors.get("white"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    theme: Theme,
    colors: HashMap<&'static str, Rgb>,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::for_theme(Theme::default())
    }
}

impl ColorTable {
    pub fn for_theme(theme: Theme) -> Self {
        let entries = match theme {
            Theme::Classic => CLASSIC,
            Theme::Dusk => DUSK,
        };
        Self {
            theme,
            colors: entries.iter().copied().collect(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Resolves a color name. Unknown foreground names fall back to `white`.
    pub fn get(&self, name: &str) -> Rgb {
        self.colors
            .get(name)
            .or_else(|| self.colors.get("white"))
            .copied()
            .unwrap_or(Rgb::new(255, 255, 255))
    }

    /// Resolves a background name. Unknown names fall back to `black`.
    pub fn background(&self, name: &str) -> Rgb {
        self.colors
            .get(name)
            .or_else(|| self.colors.get("black"))
            .copied()
            .unwrap_or(Rgb::new(0, 0, 0))
    }

    /// Foreground-on-background style from two color names.
    pub fn style(&self, fg: &str, bg: &str) -> Style {
        Style::new(self.get(fg), self.background(bg))
    }

    /// Base style for text drawn on the default background.
    pub fn text(&self, fg: &str) -> Style {
        self.style(fg, "black")
    }
}

/// A grid of colorable character cells.
///
/// `put` and `print` clip against the one-cell frame border; `set_cell` only
/// clips against the grid itself. Writes outside the grid are silent no-ops.
pub trait Surface {
    /// Columns and rows of the whole grid.
    fn size(&self) -> (i32, i32);

    fn set_cell(&mut self, col: i32, row: i32, ch: char, style: Style);

    /// Writes a glyph inside the border.
    fn put(&mut self, col: i32, row: i32, ch: char, style: Style) {
        let (cols, rows) = self.size();
        if col < BORDER || row < BORDER || col >= cols - BORDER || row >= rows - BORDER {
            return;
        }
        self.set_cell(col, row, ch, style);
    }

    /// Writes a string left to right inside the border.
    fn print(&mut self, col: i32, row: i32, text: &str, style: Style) {
        for (offset, ch) in text.chars().enumerate() {
            self.put(col + offset as i32, row, ch, style);
        }
    }

    /// Blanks one cell to the given background.
    fn erase(&mut self, col: i32, row: i32, bg: Rgb) {
        self.put(col, row, ' ', Style::new(bg, bg));
    }

    /// Blanks the whole grid, border included.
    fn clear(&mut self, bg: Rgb) {
        let (cols, rows) = self.size();
        for row in 0..rows {
            for col in 0..cols {
                self.set_cell(col, row, ' ', Style::new(bg, bg));
            }
        }
    }

    /// Box-drawing frame around the grid.
    fn draw_border(&mut self, style: Style) {
        let (cols, rows) = self.size();
        if cols < 2 || rows < 2 {
            return;
        }
        for col in 1..cols - 1 {
            self.set_cell(col, 0, '─', style);
            self.set_cell(col, rows - 1, '─', style);
        }
        for row in 1..rows - 1 {
            self.set_cell(0, row, '│', style);
            self.set_cell(cols - 1, row, '│', style);
        }
        self.set_cell(0, 0, '┌', style);
        self.set_cell(cols - 1, 0, '┐', style);
        self.set_cell(0, rows - 1, '└', style);
        self.set_cell(cols - 1, rows - 1, '┘', style);
    }
}

/// Map view size, in cells, of a grid with the given dimensions.
pub fn map_view_size((cols, rows): (i32, i32)) -> (i32, i32) {
    ((cols - 2 * BORDER).max(0), (rows - TOP_OFFSET - BORDER).max(0))
}

/// Output device under a frontend.
pub trait Backend {
    /// Back buffer the next frame is composed into.
    fn buffer_mut(&mut self) -> &mut CellBuffer;

    fn buffer(&self) -> &CellBuffer;

    /// Matches the buffer to the device size. Returns whether it changed,
    /// in which case the buffer has been blanked.
    fn refresh_size(&mut self) -> TerraResult<bool> {
        Ok(false)
    }

    /// Makes the composed buffer visible.
    fn present(&mut self) -> TerraResult<()>;

    /// Blocks until a key arrives.
    fn read_key(&mut self) -> TerraResult<Key>;

    /// Returns up to `max` pending keys without blocking.
    fn pending_keys(&mut self, max: usize) -> TerraResult<Vec<Key>>;

    /// Sleeps between frames. Backends that replay scripts may skip it.
    fn pace(&mut self, duration: std::time::Duration) {
        std::thread::sleep(duration);
    }
}

/// What the core needs from a frontend.
pub trait Renderer {
    /// Columns and rows of the map view below the top offset.
    fn visible_size(&self) -> (i32, i32);

    /// Clears, composites the scene with the global effects, presents.
    fn render_scene(&mut self, scene: &mut Scene, frame: u64, menu: Option<&MenuState>) -> TerraResult<()>;

    /// Incremental dirty-tile repaint of the game view.
    fn render_frame(&mut self, model: &mut GameModel) -> TerraResult<()>;

    /// Modal yes/no question. Anything but `y`/`Y` counts as no.
    fn prompt_yes_no(&mut self, prompt: &str) -> bool;

    /// Modal line input. `None` when cancelled or left empty.
    fn prompt_text(&mut self, prompt: &str) -> Option<String>;

    /// Writes the running map without asking.
    fn quick_save(&mut self, model: &mut GameModel);

    /// Modal inventory screen.
    fn show_inventory(&mut self, model: &mut GameModel);

    fn colors(&self) -> &ColorTable;
}
