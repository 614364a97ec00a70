//! # Scene System
//!
//! Scenes are ordered stacks of drawable layers. Global layers (weather)
//! are composited on top of whatever scene is showing, sorted together by
//! z-index.
//!
//! Menus and other screens that take over input until they finish are
//! expressed as [`Modal`]s and driven by the frontend.

pub mod effects;
pub mod flow;
pub mod menus;

pub use effects::*;
pub use flow::*;
pub use menus::*;

use crate::input::Key;
use crate::rendering::{ColorTable, Surface};

/// Read-only state a layer may consult while drawing.
#[derive(Debug, Clone, Copy)]
pub struct SceneContext<'a> {
    pub colors: &'a ColorTable,
    /// Menu of the active modal, if it has one
    pub menu: Option<&'a MenuState>,
}

/// A drawable unit of a scene.
pub trait SceneLayer {
    fn name(&self) -> &str;

    /// Layers draw in ascending z order; equal z keeps insertion order.
    fn z_index(&self) -> i32;

    fn draw(&mut self, surface: &mut dyn Surface, frame: u64, ctx: &SceneContext<'_>);
}

/// A named stack of layers.
pub struct Scene {
    pub name: String,
    layers: Vec<Box<dyn SceneLayer>>,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.layers.iter().map(|layer| layer.name()).collect();
        f.debug_struct("Scene").field("name", &self.name).field("layers", &names).finish()
    }
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: Vec::new(),
        }
    }

    /// Adds a layer, builder style.
    pub fn with_layer(mut self, layer: impl SceneLayer + 'static) -> Self {
        self.push_layer(Box::new(layer));
        self
    }

    pub fn push_layer(&mut self, layer: Box<dyn SceneLayer>) {
        self.layers.push(layer);
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// This scene's layers merged with `globals`, in draw order.
    ///
    /// Scene layers come before globals of the same z.
    pub fn layers_with<'a>(&'a mut self, globals: &'a mut [Box<dyn SceneLayer>]) -> Vec<&'a mut Box<dyn SceneLayer>> {
        let mut merged: Vec<&'a mut Box<dyn SceneLayer>> = self.layers.iter_mut().chain(globals.iter_mut()).collect();
        merged.sort_by_key(|layer| layer.z_index());
        merged
    }
}

/// Selection state of a vertical menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuState {
    pub title: String,
    pub items: Vec<String>,
    pub selected: usize,
    /// Key help drawn under the items
    pub footer: String,
    /// One-line status, e.g. the result of the last action
    pub message: Option<String>,
}

impl MenuState {
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            title: title.into(),
            items,
            ..Default::default()
        }
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    /// Moves the cursor down, wrapping to the top.
    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    /// Moves the cursor up, wrapping to the bottom.
    pub fn select_prev(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + self.items.len() - 1) % self.items.len();
        }
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    /// Drops the highlighted entry and keeps the cursor in range.
    pub fn remove_selected(&mut self) -> Option<String> {
        if self.selected >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(self.selected);
        if self.selected >= self.items.len() && self.selected > 0 {
            self.selected -= 1;
        }
        Some(removed)
    }

    /// Shared cursor handling: arrows and `w`/`s`. Returns whether the key was used.
    pub fn navigate(&mut self, key: Key) -> bool {
        match key {
            Key::Up | Key::Char('w') | Key::Char('W') => self.select_prev(),
            Key::Down | Key::Char('s') | Key::Char('S') => self.select_next(),
            _ => return false,
        }
        true
    }
}

/// A screen that owns input until it produces an outcome.
pub trait Modal {
    type Outcome;

    /// The scene to draw this frame, with the menu it shows if any.
    fn scene(&mut self) -> (&mut Scene, Option<&MenuState>);

    fn handle_key(&mut self, key: Key) -> Option<Self::Outcome>;

    /// Called once per frame before drawing.
    fn advance(&mut self, _frame: u64) -> Option<Self::Outcome> {
        None
    }

    /// Modals that only animate never block on input.
    fn accepts_input(&self) -> bool {
        true
    }
}
