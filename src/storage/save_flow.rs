//! # Save Flow
//!
//! Writing the running world back to disk: quick saves during play and the
//! questions asked when a game scene ends.

use crate::game::GameModel;
use crate::rendering::{Backend, Frontend, Renderer};
use crate::scenes::{SavePickerScene, SaveTarget};
use crate::storage::{normalize_map_name, save_player, MapDirectory, MapFile};
use crate::TerraResult;
use log::{info, warn};
use std::path::Path;

/// File a quick save goes to when the map has no file yet.
pub const QUICKSAVE_NAME: &str = "quicksave.json";

/// Map document for the model's current world, player position included.
pub fn snapshot_map(model: &GameModel) -> MapFile {
    let mut map = MapFile::new(model.world_width, model.world_height, model.store.to_scenery());
    map.extras = model.extras.clone();
    map.set_player_position(model.player.position());
    map
}

/// Writes the world without asking.
///
/// Uses the loaded map's file, otherwise [`QUICKSAVE_NAME`], which the model
/// then adopts as its file.
pub fn quick_save(maps: &MapDirectory, model: &mut GameModel) -> bool {
    let name = model
        .loaded_map_name
        .clone()
        .unwrap_or_else(|| QUICKSAVE_NAME.to_string());
    if !maps.save(&name, &snapshot_map(model)) {
        return false;
    }
    info!("Quick saved to {}", name);
    model.loaded_map_name.get_or_insert(name);
    true
}

/// Saves the player and, after asking, the map, once a game scene has ended.
///
/// Returns the name of the map file written, if any.
pub fn finish_game<B: Backend>(
    frontend: &mut Frontend<B>,
    model: &GameModel,
    maps: &MapDirectory,
    player_path: &Path,
) -> TerraResult<Option<String>> {
    if !save_player(player_path, &model.player.to_record()) {
        warn!("Player progress was not saved");
    }

    let name = match &model.loaded_map_name {
        Some(name) => {
            if !frontend.prompt_yes_no(&format!("Save changes to {}?", name)) {
                return Ok(None);
            }
            return Ok(store_player_position(maps, name, model).then(|| name.clone()));
        }
        None => {
            let wants_save = match model.save_on_exit {
                Some(answer) => answer,
                None => frontend.prompt_yes_no("Save this map?"),
            };
            if !wants_save {
                return Ok(None);
            }
            match frontend.run_modal(&mut SavePickerScene::new(maps))? {
                SaveTarget::Existing(name) => name,
                SaveTarget::NewName => match frontend.prompt_text("Map name:") {
                    Some(name) => normalize_map_name(&name),
                    None => return Ok(None),
                },
                SaveTarget::Cancel => return Ok(None),
            }
        }
    };

    Ok(maps.save(&name, &snapshot_map(model)).then_some(name))
}

/// Records the player's coordinates in the map file `name`.
///
/// The rest of the document on disk is kept. A missing or unreadable file is
/// replaced by a snapshot of the running world.
fn store_player_position(maps: &MapDirectory, name: &str, model: &GameModel) -> bool {
    let map = match maps.load(name) {
        Some(mut map) => {
            map.set_player_position(model.player.position());
            map
        }
        None => snapshot_map(model),
    };
    maps.save(name, &map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameSettings;
    use crate::game::store::{LayeredTileStore, TileInstance};
    use crate::game::tiles::ids;
    use crate::game::{Player, Position};
    use crate::input::Key;
    use crate::rendering::{HeadlessBackend, HeadlessFrontend, ScriptStep};
    use crate::storage::load_player;
    use tempfile::TempDir;

    fn headless(keys: &[Key]) -> HeadlessFrontend {
        let settings = GameSettings {
            target_fps: 0,
            ..GameSettings::default()
        };
        let backend = HeadlessBackend::new(60, 20).with_script(keys.iter().copied().map(ScriptStep::Key));
        HeadlessFrontend::new(backend, &settings)
    }

    fn model() -> GameModel {
        let mut store = LayeredTileStore::new();
        store.place(TileInstance::new(1, 1, ids::TREE));
        GameModel::new(Player::new("Saver", Position::new(4, 2)), store, 30, 20)
    }

    #[test]
    fn test_snapshot_records_player() {
        let map = snapshot_map(&model());
        assert_eq!(map.player_position(), Some(Position::new(4, 2)));
        assert_eq!((map.world_width, map.world_height), (30, 20));
        assert!(map.scenery.iter().any(|tile| tile.is(ids::TREE)));
    }

    #[test]
    fn test_quick_save_adopts_name() {
        let dir = TempDir::new().unwrap();
        let maps = MapDirectory::new(dir.path());
        let mut model = model();
        assert!(quick_save(&maps, &mut model));
        assert_eq!(model.loaded_map_name.as_deref(), Some(QUICKSAVE_NAME));
        assert!(maps.exists(QUICKSAVE_NAME));
    }

    #[test]
    fn test_declined_save_still_saves_player() -> TerraResult<()> {
        let dir = TempDir::new().unwrap();
        let maps = MapDirectory::new(dir.path().join("maps"));
        let player_path = dir.path().join("character.json");
        let mut front = headless(&[Key::Char('n')]);

        assert_eq!(finish_game(&mut front, &model(), &maps, &player_path)?, None);
        assert_eq!(load_player(&player_path).map(|record| record.name), Some("Saver".to_string()));
        assert!(maps.list().is_empty());
        Ok(())
    }

    #[test]
    fn test_new_map_gets_named() -> TerraResult<()> {
        let dir = TempDir::new().unwrap();
        let maps = MapDirectory::new(dir.path().join("maps"));
        let player_path = dir.path().join("character.json");
        let keys = [Key::Char('y'), Key::Enter, Key::Char('h'), Key::Char('i'), Key::Enter];
        let mut front = headless(&keys);

        let saved = finish_game(&mut front, &model(), &maps, &player_path)?;
        assert_eq!(saved.as_deref(), Some("hi.json"));
        let map = maps.load("hi").unwrap();
        assert_eq!(map.player_position(), Some(Position::new(4, 2)));
        Ok(())
    }

    #[test]
    fn test_answer_from_quit_is_not_asked_again() -> TerraResult<()> {
        let dir = TempDir::new().unwrap();
        let maps = MapDirectory::new(dir.path().join("maps"));
        maps.save("old", &MapFile::default());
        let mut model = model();
        model.save_on_exit = Some(true);
        let mut front = headless(&[Key::Down, Key::Enter]);

        let saved = finish_game(&mut front, &model, &maps, &dir.path().join("p.json"))?;
        assert_eq!(saved.as_deref(), Some("old.json"));
        assert_eq!(maps.load("old").unwrap().world_width, 30);
        Ok(())
    }

    #[test]
    fn test_loaded_map_overwrites_on_yes() -> TerraResult<()> {
        let dir = TempDir::new().unwrap();
        let maps = MapDirectory::new(dir.path().join("maps"));
        let mut model = model();
        model.loaded_map_name = Some("home.json".to_string());

        let mut front = headless(&[Key::Escape]);
        assert_eq!(finish_game(&mut front, &model, &maps, &dir.path().join("p.json"))?, None);
        assert!(!maps.exists("home"));

        let mut front = headless(&[Key::Char('y')]);
        assert_eq!(
            finish_game(&mut front, &model, &maps, &dir.path().join("p.json"))?.as_deref(),
            Some("home.json")
        );
        assert!(maps.exists("home"));
        Ok(())
    }

    #[test]
    fn test_save_changes_only_moves_player() -> TerraResult<()> {
        let dir = TempDir::new().unwrap();
        let maps = MapDirectory::new(dir.path().join("maps"));
        let on_disk = MapFile::new(12, 12, vec![TileInstance::new(3, 3, ids::ROCK)]);
        assert!(maps.save("home", &on_disk));
        let mut model = model();
        model.loaded_map_name = Some("home.json".to_string());

        let mut front = headless(&[Key::Char('y')]);
        let saved = finish_game(&mut front, &model, &maps, &dir.path().join("p.json"))?;
        assert_eq!(saved.as_deref(), Some("home.json"));

        let reread = maps.load("home").unwrap();
        assert_eq!(reread.player_position(), Some(Position::new(4, 2)));
        assert_eq!(reread.scenery, on_disk.scenery);
        assert_eq!(reread.world_width, 12);
        Ok(())
    }
}
