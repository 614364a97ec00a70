//! # Menu Scenes
//!
//! The modal screens of the game: home menu, map loader, settings,
//! inventory, save picker and the transition into a game.

use crate::config::GameSettings;
use crate::game::items::ItemInstance;
use crate::game::player::{Player, EQUIPMENT_SLOTS};
use crate::input::Key;
use crate::rendering::{Rgb, Style, Surface};
use crate::scenes::{MenuState, Modal, RainLayer, Scene, SceneContext, SceneLayer};
use crate::storage::{MapDirectory, MapFile};
use log::{debug, info};

pub const BACKDROP_Z: i32 = 0;
pub const MENU_Z: i32 = 400;
pub const TITLE_Z: i32 = 500;

/// Frames a transition lasts.
pub const TRANSITION_FRAMES: u64 = 12;

fn centered(surface: &mut dyn Surface, row: i32, text: &str, style: Style) {
    let (cols, _) = surface.size();
    let col = ((cols - text.chars().count() as i32) / 2).max(1);
    surface.print(col, row, text, style);
}

/// Blank screen with the frame border.
#[derive(Debug, Default)]
pub struct BackdropLayer;

impl SceneLayer for BackdropLayer {
    fn name(&self) -> &str {
        "backdrop"
    }

    fn z_index(&self) -> i32 {
        BACKDROP_Z
    }

    fn draw(&mut self, surface: &mut dyn Surface, _frame: u64, ctx: &SceneContext<'_>) {
        surface.clear(ctx.colors.background("black"));
        surface.draw_border(ctx.colors.text("border"));
    }
}

/// Draws the active modal's menu.
#[derive(Debug, Default)]
pub struct MenuLayer;

impl SceneLayer for MenuLayer {
    fn name(&self) -> &str {
        "menu"
    }

    fn z_index(&self) -> i32 {
        MENU_Z
    }

    fn draw(&mut self, surface: &mut dyn Surface, _frame: u64, ctx: &SceneContext<'_>) {
        let Some(menu) = ctx.menu else {
            return;
        };
        let (_, rows) = surface.size();
        centered(surface, 4, &menu.title, ctx.colors.text("hud").bold());

        for (index, item) in menu.items.iter().enumerate() {
            let row = 6 + index as i32;
            if index == menu.selected {
                centered(surface, row, &format!("> {} <", item), ctx.colors.text("highlight").bold());
            } else {
                centered(surface, row, item, ctx.colors.text("white"));
            }
        }
        if let Some(message) = &menu.message {
            centered(surface, rows - 4, message, ctx.colors.text("yellow"));
        }
        if !menu.footer.is_empty() {
            centered(surface, rows - 2, &menu.footer, ctx.colors.text("grey"));
        }
    }
}

/// Large heading at the top of a screen.
#[derive(Debug)]
pub struct TitleLayer {
    text: String,
}

impl TitleLayer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl SceneLayer for TitleLayer {
    fn name(&self) -> &str {
        "title"
    }

    fn z_index(&self) -> i32 {
        TITLE_Z
    }

    fn draw(&mut self, surface: &mut dyn Surface, frame: u64, ctx: &SceneContext<'_>) {
        let pulse = (frame % 20) as f32 / 19.0;
        let color = ctx.colors.get("green").lerp(ctx.colors.get("bright_green"), pulse);
        let style = Style::new(color, ctx.colors.background("black")).bold();
        centered(surface, 2, &self.text, style);
    }
}

fn menu_scene(name: &str, title: Option<&str>) -> Scene {
    let scene = Scene::new(name).with_layer(BackdropLayer).with_layer(MenuLayer);
    match title {
        Some(title) => scene.with_layer(TitleLayer::new(title)),
        None => scene,
    }
}

/// Choices on the home menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeChoice {
    Play,
    Settings,
    Quit,
}

/// Top-level menu shown at startup and after every game.
#[derive(Debug)]
pub struct HomeScene {
    scene: Scene,
    menu: MenuState,
}

impl Default for HomeScene {
    fn default() -> Self {
        Self::new()
    }
}

impl HomeScene {
    pub fn new() -> Self {
        let items = vec!["1. Play".to_string(), "2. Settings".to_string(), "3. Quit".to_string()];
        Self {
            scene: menu_scene("home", Some("T E R R A T I L E")),
            menu: MenuState::new("Main Menu", items).with_footer("1-3 or arrows + Enter, Esc quits"),
        }
    }
}

impl Modal for HomeScene {
    type Outcome = HomeChoice;

    fn scene(&mut self) -> (&mut Scene, Option<&MenuState>) {
        (&mut self.scene, Some(&self.menu))
    }

    fn handle_key(&mut self, key: Key) -> Option<HomeChoice> {
        match key {
            Key::Char('1') => Some(HomeChoice::Play),
            Key::Char('2') => Some(HomeChoice::Settings),
            Key::Char('3') | Key::Char('q') | Key::Escape => Some(HomeChoice::Quit),
            Key::Enter => [HomeChoice::Play, HomeChoice::Settings, HomeChoice::Quit]
                .get(self.menu.selected)
                .copied(),
            other => {
                self.menu.navigate(other);
                None
            }
        }
    }
}

/// What to play, picked on the load screen.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadChoice {
    Cancel,
    /// A freshly generated world
    Generate,
    /// A map not backed by a file
    Map(MapFile),
    /// A map file by name
    File(String),
}

/// Lists map files alongside the generate and blank-map entries.
#[derive(Debug)]
pub struct LoadScene {
    scene: Scene,
    menu: MenuState,
    maps: MapDirectory,
    files: Vec<String>,
}

const FIXED_LOAD_ENTRIES: usize = 2;

impl LoadScene {
    pub fn new(maps: MapDirectory) -> Self {
        let files = maps.list();
        let mut items = vec!["[Generate new world]".to_string(), "[New blank map]".to_string()];
        items.extend(files.iter().cloned());
        debug!("Load screen lists {} maps", files.len());
        Self {
            scene: menu_scene("load", None),
            menu: MenuState::new("Choose a world", items).with_footer("Enter plays, d deletes a map, Esc goes back"),
            maps,
            files,
        }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    fn delete_selected(&mut self) {
        let Some(index) = self.menu.selected.checked_sub(FIXED_LOAD_ENTRIES) else {
            return;
        };
        let Some(name) = self.files.get(index).cloned() else {
            return;
        };
        if self.maps.delete(&name) {
            self.files.remove(index);
            self.menu.remove_selected();
            self.menu.message = Some(format!("Deleted {}", name));
        } else {
            self.menu.message = Some(format!("Could not delete {}", name));
        }
    }
}

impl Modal for LoadScene {
    type Outcome = LoadChoice;

    fn scene(&mut self) -> (&mut Scene, Option<&MenuState>) {
        (&mut self.scene, Some(&self.menu))
    }

    fn handle_key(&mut self, key: Key) -> Option<LoadChoice> {
        match key {
            Key::Escape | Key::Char('q') => Some(LoadChoice::Cancel),
            Key::Enter => match self.menu.selected {
                0 => Some(LoadChoice::Generate),
                1 => Some(LoadChoice::Map(MapFile::default())),
                n => self.files.get(n - FIXED_LOAD_ENTRIES).cloned().map(LoadChoice::File),
            },
            Key::Delete | Key::Char('d') => {
                self.delete_selected();
                None
            }
            other => {
                self.menu.navigate(other);
                None
            }
        }
    }
}

/// Edits a copy of the settings; the outcome is the edited copy.
#[derive(Debug)]
pub struct SettingsScene {
    scene: Scene,
    menu: MenuState,
    settings: GameSettings,
}

const SETTINGS_ENTRIES: usize = 10;

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

impl SettingsScene {
    pub fn new(settings: GameSettings) -> Self {
        let mut screen = Self {
            scene: menu_scene("settings", None),
            menu: MenuState::new("Settings", Vec::new()).with_footer("Enter changes, Esc saves and goes back"),
            settings,
        };
        screen.relabel();
        screen
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    fn relabel(&mut self) {
        let s = &self.settings;
        self.menu.items = vec![
            format!("Theme: {}", s.theme.name()),
            format!("Weather: {}", s.weather.name()),
            format!("Rivers: {}", on_off(s.rivers)),
            format!("Grass: {}", on_off(s.grass)),
            format!("Trees: {}", on_off(s.trees)),
            format!("Rocks: {}", on_off(s.rocks)),
            format!("Path sliding: {}", on_off(s.enable_sliding)),
            format!("Respawn: {}", on_off(s.enable_respawn)),
            format!("Transitions: {}", on_off(s.transitions)),
            "Back".to_string(),
        ];
    }

    /// Changes the selected entry. Returns true on "Back".
    fn change_selected(&mut self) -> bool {
        let s = &mut self.settings;
        match self.menu.selected {
            0 => s.theme = s.theme.next(),
            1 => s.weather = s.weather.next(),
            2 => s.rivers = !s.rivers,
            3 => s.grass = !s.grass,
            4 => s.trees = !s.trees,
            5 => s.rocks = !s.rocks,
            6 => s.enable_sliding = !s.enable_sliding,
            7 => s.enable_respawn = !s.enable_respawn,
            8 => s.transitions = !s.transitions,
            _ => return true,
        }
        self.relabel();
        false
    }
}

impl Modal for SettingsScene {
    type Outcome = GameSettings;

    fn scene(&mut self) -> (&mut Scene, Option<&MenuState>) {
        (&mut self.scene, Some(&self.menu))
    }

    fn handle_key(&mut self, key: Key) -> Option<GameSettings> {
        match key {
            Key::Escape | Key::Char('q') => Some(self.settings.clone()),
            Key::Enter | Key::Char(' ') | Key::Left | Key::Right => {
                if self.change_selected() {
                    Some(self.settings.clone())
                } else {
                    None
                }
            }
            other => {
                self.menu.navigate(other);
                None
            }
        }
    }
}

fn describe_item(item: &ItemInstance) -> String {
    let stats: Vec<String> = item
        .effective_stats()
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    if stats.is_empty() {
        item.name().to_string()
    } else {
        format!("{} ({})", item.name(), stats.join(", "))
    }
}

/// Inventory with equipping. Borrows the player for as long as it is open.
#[derive(Debug)]
pub struct InventoryScene<'a> {
    scene: Scene,
    menu: MenuState,
    player: &'a mut Player,
}

impl<'a> InventoryScene<'a> {
    pub fn new(player: &'a mut Player) -> Self {
        let mut screen = Self {
            scene: menu_scene("inventory", None),
            menu: MenuState::new("Inventory", Vec::new()).with_footer("Enter equips, Esc closes"),
            player,
        };
        screen.refresh();
        screen
    }

    fn refresh(&mut self) {
        self.menu.items = if self.player.inventory.is_empty() {
            vec!["(empty)".to_string()]
        } else {
            self.player.inventory.iter().map(describe_item).collect()
        };
        if self.menu.selected >= self.menu.items.len() {
            self.menu.selected = self.menu.items.len() - 1;
        }
        let equipped: Vec<String> = EQUIPMENT_SLOTS
            .iter()
            .map(|slot| {
                let item = self.player.equipped.get(*slot).and_then(Option::as_ref);
                format!("{}: {}", slot, item.map(ItemInstance::name).unwrap_or("-"))
            })
            .collect();
        self.menu.message = Some(equipped.join("  "));
    }
}

impl Modal for InventoryScene<'_> {
    type Outcome = ();

    fn scene(&mut self) -> (&mut Scene, Option<&MenuState>) {
        (&mut self.scene, Some(&self.menu))
    }

    fn handle_key(&mut self, key: Key) -> Option<()> {
        match key {
            Key::Escape | Key::Char('q') | Key::Char('i') => Some(()),
            Key::Enter => {
                if self.player.equip(self.menu.selected) {
                    info!("Equipped item {}", self.menu.selected);
                    self.refresh();
                }
                None
            }
            other => {
                self.menu.navigate(other);
                None
            }
        }
    }
}

/// Where to write a map that has no file yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Existing(String),
    NewName,
    Cancel,
}

/// Picks an existing map file to overwrite, or asks for a new name.
#[derive(Debug)]
pub struct SavePickerScene {
    scene: Scene,
    menu: MenuState,
    files: Vec<String>,
}

impl SavePickerScene {
    pub fn new(maps: &MapDirectory) -> Self {
        let files = maps.list();
        let mut items = vec!["[New map]".to_string()];
        items.extend(files.iter().cloned());
        Self {
            scene: menu_scene("save", None),
            menu: MenuState::new("Save map as", items).with_footer("Enter picks, Esc discards"),
            files,
        }
    }
}

impl Modal for SavePickerScene {
    type Outcome = SaveTarget;

    fn scene(&mut self) -> (&mut Scene, Option<&MenuState>) {
        (&mut self.scene, Some(&self.menu))
    }

    fn handle_key(&mut self, key: Key) -> Option<SaveTarget> {
        match key {
            Key::Escape | Key::Char('q') => Some(SaveTarget::Cancel),
            Key::Enter => match self.menu.selected {
                0 => Some(SaveTarget::NewName),
                n => self.files.get(n - 1).cloned().map(SaveTarget::Existing),
            },
            other => {
                self.menu.navigate(other);
                None
            }
        }
    }
}

/// Full-screen color fade between two named colors.
#[derive(Debug)]
pub struct FadeLayer {
    from: &'static str,
    to: &'static str,
    start: Option<u64>,
    length: u64,
}

impl FadeLayer {
    pub fn new(from: &'static str, to: &'static str, length: u64) -> Self {
        Self {
            from,
            to,
            start: None,
            length: length.max(1),
        }
    }

    fn progress(&mut self, frame: u64) -> f32 {
        let start = *self.start.get_or_insert(frame);
        (frame.saturating_sub(start) as f32 / self.length as f32).min(1.0)
    }
}

impl SceneLayer for FadeLayer {
    fn name(&self) -> &str {
        "fade"
    }

    fn z_index(&self) -> i32 {
        BACKDROP_Z
    }

    fn draw(&mut self, surface: &mut dyn Surface, frame: u64, ctx: &SceneContext<'_>) {
        let t = self.progress(frame);
        let color: Rgb = ctx.colors.background(self.from).lerp(ctx.colors.background(self.to), t);
        surface.clear(color);
    }
}

/// Animated fade into a game. Ignores input and ends after a fixed number of frames.
#[derive(Debug)]
pub struct TransitionScene {
    scene: Scene,
    start: Option<u64>,
    length: u64,
}

impl TransitionScene {
    pub fn new(seed: u64) -> Self {
        Self {
            scene: Scene::new("transition")
                .with_layer(FadeLayer::new("black", "grass", TRANSITION_FRAMES))
                .with_layer(RainLayer::new(seed))
                .with_layer(TitleLayer::new("Entering the world...")),
            start: None,
            length: TRANSITION_FRAMES,
        }
    }
}

impl Modal for TransitionScene {
    type Outcome = ();

    fn scene(&mut self) -> (&mut Scene, Option<&MenuState>) {
        (&mut self.scene, None)
    }

    fn handle_key(&mut self, _key: Key) -> Option<()> {
        None
    }

    fn advance(&mut self, frame: u64) -> Option<()> {
        let start = *self.start.get_or_insert(frame);
        (frame - start >= self.length).then_some(())
    }

    fn accepts_input(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Weather;
    use crate::rendering::{HeadlessBackend, HeadlessFrontend, ScriptStep};
    use crate::TerraResult;
    use tempfile::TempDir;

    fn headless(keys: &[Key]) -> HeadlessFrontend {
        let settings = GameSettings {
            target_fps: 0,
            ..GameSettings::default()
        };
        let backend = HeadlessBackend::new(60, 20).with_script(keys.iter().copied().map(ScriptStep::Key));
        HeadlessFrontend::new(backend, &settings)
    }

    #[test]
    fn test_home_keys() {
        let mut home = HomeScene::new();
        assert_eq!(home.handle_key(Key::Char('2')), Some(HomeChoice::Settings));
        assert_eq!(home.handle_key(Key::Down), None);
        assert_eq!(home.handle_key(Key::Down), None);
        assert_eq!(home.handle_key(Key::Enter), Some(HomeChoice::Quit));
        assert_eq!(home.handle_key(Key::Escape), Some(HomeChoice::Quit));
    }

    #[test]
    fn test_home_draws_menu() -> TerraResult<()> {
        let mut front = headless(&[Key::Char('1')]);
        let choice = front.run_modal(&mut HomeScene::new())?;
        assert_eq!(choice, HomeChoice::Play);
        let screen = front.screen_text();
        assert!(screen.contains("> 1. Play <"));
        assert!(screen.contains("T E R R A T I L E"));
        Ok(())
    }

    #[test]
    fn test_load_screen_entries() {
        let dir = TempDir::new().unwrap();
        let maps = MapDirectory::new(dir.path());
        maps.save("alpha", &MapFile::default());
        let mut load = LoadScene::new(maps);
        assert_eq!(load.files(), ["alpha.json".to_string()]);

        assert_eq!(load.handle_key(Key::Enter), Some(LoadChoice::Generate));
        load.handle_key(Key::Down);
        assert_eq!(load.handle_key(Key::Enter), Some(LoadChoice::Map(MapFile::default())));
        load.handle_key(Key::Down);
        assert_eq!(load.handle_key(Key::Enter), Some(LoadChoice::File("alpha.json".into())));
        assert_eq!(load.handle_key(Key::Escape), Some(LoadChoice::Cancel));
    }

    #[test]
    fn test_load_screen_delete() {
        let dir = TempDir::new().unwrap();
        let maps = MapDirectory::new(dir.path());
        maps.save("alpha", &MapFile::default());
        let mut load = LoadScene::new(maps.clone());

        load.handle_key(Key::Char('d'));
        assert_eq!(load.files().len(), 1);

        load.handle_key(Key::Up);
        assert_eq!(load.handle_key(Key::Delete), None);
        assert!(load.files().is_empty());
        assert!(!maps.exists("alpha"));
        assert_eq!(load.menu.items.len(), FIXED_LOAD_ENTRIES);
    }

    #[test]
    fn test_settings_toggle_and_back() {
        let mut screen = SettingsScene::new(GameSettings::default());
        screen.handle_key(Key::Down);
        screen.handle_key(Key::Enter);
        assert_eq!(screen.settings().weather, Weather::Snow);
        assert!(screen.menu.items[1].ends_with("snow"));

        screen.handle_key(Key::Up);
        screen.handle_key(Key::Up);
        let done = screen.handle_key(Key::Enter).unwrap();
        assert_eq!(done.weather, Weather::Snow);
        assert_eq!(screen.menu.items.len(), SETTINGS_ENTRIES);
    }

    #[test]
    fn test_inventory_equips() {
        let mut player = Player::default();
        player.inventory = vec![ItemInstance::new("StoneAxe"), ItemInstance::new("Lantern")];
        {
            let mut screen = InventoryScene::new(&mut player);
            assert!(screen.menu.items[0].starts_with("Stone Axe"));
            screen.handle_key(Key::Down);
            assert_eq!(screen.handle_key(Key::Enter), None);
            assert_eq!(screen.menu.selected, 0);
            assert!(screen.menu.message.as_deref().unwrap_or("").contains("offhand: Lantern"));
            assert_eq!(screen.handle_key(Key::Char('i')), Some(()));
        }
        assert_eq!(player.inventory.len(), 1);
        assert!(player.equipped.get("offhand").and_then(Option::as_ref).is_some());
    }

    #[test]
    fn test_save_picker() {
        let dir = TempDir::new().unwrap();
        let maps = MapDirectory::new(dir.path());
        maps.save("beta", &MapFile::default());
        let mut picker = SavePickerScene::new(&maps);
        assert_eq!(picker.handle_key(Key::Enter), Some(SaveTarget::NewName));
        picker.handle_key(Key::Down);
        assert_eq!(picker.handle_key(Key::Enter), Some(SaveTarget::Existing("beta.json".into())));
        assert_eq!(picker.handle_key(Key::Escape), Some(SaveTarget::Cancel));
    }

    #[test]
    fn test_transition_ends_without_input() -> TerraResult<()> {
        let mut front = headless(&[]);
        front.run_modal(&mut TransitionScene::new(1))?;
        assert_eq!(front.backend().presented(), TRANSITION_FRAMES as usize);
        assert!(front.screen_text().contains("Entering the world"));
        Ok(())
    }
}
