//! # Scene Flow
//!
//! The state machine tying the screens together:
//! home menu, settings, and the play loop (pick a world, run it, save).

use crate::config::GameSettings;
use crate::game::{build_from_file, build_generated, GameEngine, GameModel};
use crate::generation::generate_terrain;
use crate::rendering::{Backend, Frontend};
use crate::scenes::{HomeChoice, HomeScene, LoadChoice, LoadScene, SettingsScene, TransitionScene};
use crate::storage::{finish_game, load_player, MapDirectory};
use crate::TerraResult;
use log::{info, warn};
use std::path::PathBuf;

/// Where the flow is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Home,
    Play,
    Settings,
    Quit,
}

/// Runs screens until the player quits from the home menu.
#[derive(Debug)]
pub struct SceneFlow {
    state: FlowState,
    settings: GameSettings,
    settings_path: PathBuf,
    maps: MapDirectory,
    player_path: PathBuf,
}

impl SceneFlow {
    pub fn new(settings: GameSettings, settings_path: impl Into<PathBuf>) -> Self {
        Self {
            state: FlowState::Home,
            maps: MapDirectory::new(&settings.maps_dir),
            player_path: settings.character_path.clone(),
            settings,
            settings_path: settings_path.into(),
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn run<B: Backend>(&mut self, frontend: &mut Frontend<B>) -> TerraResult<()> {
        info!("Scene flow started");
        while self.state != FlowState::Quit {
            self.state = self.step(frontend)?;
        }
        info!("Scene flow finished");
        Ok(())
    }

    /// Runs the current state to completion and returns the next one.
    pub fn step<B: Backend>(&mut self, frontend: &mut Frontend<B>) -> TerraResult<FlowState> {
        let next = match self.state {
            FlowState::Home => match frontend.run_modal(&mut HomeScene::new())? {
                HomeChoice::Play => FlowState::Play,
                HomeChoice::Settings => FlowState::Settings,
                HomeChoice::Quit => FlowState::Quit,
            },
            FlowState::Play => {
                self.play(frontend)?;
                FlowState::Home
            }
            FlowState::Settings => {
                self.settings = frontend.run_modal(&mut SettingsScene::new(self.settings.clone()))?;
                if !self.settings.save(&self.settings_path) {
                    warn!("Settings apply to this session only");
                }
                frontend.apply_settings(&self.settings);
                self.maps = MapDirectory::new(&self.settings.maps_dir);
                FlowState::Home
            }
            FlowState::Quit => FlowState::Quit,
        };
        if next != self.state {
            info!("Scene {:?} -> {:?}", self.state, next);
        }
        Ok(next)
    }

    fn play<B: Backend>(&mut self, frontend: &mut Frontend<B>) -> TerraResult<()> {
        let Some(mut model) = self.pick_world(frontend)? else {
            return Ok(());
        };
        model.context.enable_sliding = self.settings.enable_sliding;
        model.context.enable_respawn = self.settings.enable_respawn;

        if self.settings.transitions {
            frontend.run_modal(&mut TransitionScene::new(self.settings.seed.unwrap_or(0)))?;
        }
        GameEngine::from_settings(&self.settings).run(&mut model, frontend)?;

        if let Some(name) = finish_game(frontend, &model, &self.maps, &self.player_path)? {
            info!("Map saved as {}", name);
        }
        Ok(())
    }

    /// Load screen. `None` when cancelled or the chosen file is unusable.
    fn pick_world<B: Backend>(&mut self, frontend: &mut Frontend<B>) -> TerraResult<Option<GameModel>> {
        let record = load_player(&self.player_path);
        let model = match frontend.run_modal(&mut LoadScene::new(self.maps.clone()))? {
            LoadChoice::Cancel => None,
            LoadChoice::Generate => {
                let seed = self.settings.seed.unwrap_or_else(rand::random);
                info!("Generating world with seed {}", seed);
                let map = generate_terrain(&self.settings.generation_config(seed))?;
                Some(build_generated(map, record))
            }
            LoadChoice::Map(map) => Some(build_generated(map, record)),
            LoadChoice::File(name) => {
                let model = build_from_file(&self.maps, &name, record);
                if model.is_none() {
                    warn!("Map {} could not be loaded", name);
                }
                model
            }
        };
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Weather;
    use crate::rendering::{HeadlessBackend, HeadlessFrontend};
    use std::fs;
    use tempfile::TempDir;

    fn settings_in(dir: &TempDir) -> GameSettings {
        GameSettings {
            target_fps: 0,
            transitions: false,
            seed: Some(7),
            world_width: 30,
            world_height: 20,
            maps_dir: dir.path().join("maps"),
            character_path: dir.path().join("character").join("character_data.json"),
            ..GameSettings::default()
        }
    }

    fn run_script(dir: &TempDir, settings: GameSettings, script: &str) -> TerraResult<(SceneFlow, HeadlessFrontend)> {
        let backend = HeadlessBackend::from_script_text(80, 24, script)?;
        let mut frontend = HeadlessFrontend::new(backend, &settings);
        let mut flow = SceneFlow::new(settings, dir.path().join("settings.json"));
        flow.run(&mut frontend)?;
        Ok((flow, frontend))
    }

    #[test]
    fn test_quit_from_home() -> TerraResult<()> {
        let dir = TempDir::new().unwrap();
        let (flow, _) = run_script(&dir, settings_in(&dir), "3")?;
        assert_eq!(flow.state(), FlowState::Quit);
        Ok(())
    }

    #[test]
    fn test_generated_game_round_trip() -> TerraResult<()> {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        let player_path = settings.character_path.clone();
        let (_, frontend) = run_script(&dir, settings, "1<enter>d<idle>q<idle>n3")?;

        assert!(load_player(&player_path).is_some());
        assert!(MapDirectory::new(dir.path().join("maps")).list().is_empty());
        assert!(frontend.backend().remaining() == 0);
        Ok(())
    }

    #[test]
    fn test_settings_are_saved() -> TerraResult<()> {
        let dir = TempDir::new().unwrap();
        let (flow, frontend) = run_script(&dir, settings_in(&dir), "2<down><enter><esc>3")?;
        assert_eq!(flow.settings().weather, Weather::Snow);
        assert_eq!(GameSettings::load(&dir.path().join("settings.json")).weather, Weather::Snow);
        assert_eq!(frontend.backend().remaining(), 0);
        Ok(())
    }

    #[test]
    fn test_unreadable_map_returns_home() -> TerraResult<()> {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        fs::create_dir_all(&settings.maps_dir)?;
        fs::write(settings.maps_dir.join("broken.json"), "{ not json")?;
        let player_path = settings.character_path.clone();

        run_script(&dir, settings, "1<down><down><enter>3")?;
        assert!(load_player(&player_path).is_none());
        Ok(())
    }
}
