//! # Action Dispatcher
//!
//! Applies one [`Action`] to the game model. Every action runs through the
//! common phase first, then the editor phase while editor commands are on,
//! otherwise the play phase.

use crate::game::placement::place_tile;
use crate::game::state::{ActionFlash, GameModel, RespawnEntry, UndoEntry};
use crate::game::tiles::{ids, registry};
use crate::game::Position;
use crate::input::Action;
use crate::rendering::Renderer;
use log::{debug, info};

/// What a dispatched action did, folded into the engine's frame state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub moved: bool,
    pub quit_requested: bool,
    pub full_redraw: bool,
}

impl DispatchOutcome {
    fn merge(self, other: DispatchOutcome) -> DispatchOutcome {
        DispatchOutcome {
            moved: self.moved || other.moved,
            quit_requested: self.quit_requested || other.quit_requested,
            full_redraw: self.full_redraw || other.full_redraw,
        }
    }

    fn redraw() -> DispatchOutcome {
        DispatchOutcome {
            full_redraw: true,
            ..Default::default()
        }
    }
}

/// Runs `action` through the dispatcher phases and applies the result to `model`.
pub fn dispatch(action: Action, model: &mut GameModel, renderer: &mut dyn Renderer) -> DispatchOutcome {
    debug!("Dispatching {}", action);
    let mut outcome = dispatch_common(action, model, renderer);
    if model.context.enable_editor_commands {
        outcome = outcome.merge(dispatch_editor(action, model));
    } else {
        outcome = outcome.merge(dispatch_play(action, model));
    }

    if outcome.full_redraw {
        model.request_full_redraw();
    }
    if outcome.quit_requested {
        model.should_quit = true;
    }
    outcome
}

fn dispatch_common(action: Action, model: &mut GameModel, renderer: &mut dyn Renderer) -> DispatchOutcome {
    if let Some(direction) = action.movement() {
        let mut moved = false;
        for _ in 0..model.debug.walk_speed_multiplier.max(1) {
            let from = model.player.position();
            if model.player.step(direction, &model.store, &model.debug) {
                model.mark_dirty(from);
                model.mark_dirty(model.player.position());
                moved = true;
            }
        }
        return DispatchOutcome {
            moved,
            ..Default::default()
        };
    }

    match action {
        Action::Quit => {
            if model.loaded_map_name.is_some() {
                renderer.quick_save(model);
            } else {
                model.save_on_exit = Some(renderer.prompt_yes_no("save generated map?"));
            }
            info!("Quit requested");
            DispatchOutcome {
                quit_requested: true,
                ..Default::default()
            }
        }
        Action::DebugToggle => {
            let enabled = model.debug.toggle();
            info!("Debug walk {}", if enabled { "enabled" } else { "disabled" });
            DispatchOutcome::redraw()
        }
        Action::EditorToggle => {
            let entering = model.context.toggle_editor();
            if entering && model.editor_palette.is_empty() {
                model.editor_palette = registry()
                    .placeable_ids()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                model.editor_index = 0;
            }
            info!("Switched to {:?} mode", model.context.mode);
            DispatchOutcome::redraw()
        }
        Action::SaveQuick => {
            renderer.quick_save(model);
            DispatchOutcome::default()
        }
        Action::ShowInventory => {
            renderer.show_inventory(model);
            DispatchOutcome::redraw()
        }
        _ => DispatchOutcome::default(),
    }
}

fn dispatch_editor(action: Action, model: &mut GameModel) -> DispatchOutcome {
    match action {
        Action::PlaceItem => {
            let Some(selection) = model.palette_selection().map(str::to_string) else {
                return DispatchOutcome::default();
            };
            let placed = place_tile(
                &mut model.store,
                &selection,
                model.player.position(),
                model.player.facing,
                model.context.is_editor(),
            );
            for instance in &placed {
                model.mark_dirty(instance.position());
            }
            if !placed.is_empty() {
                model.editor_undo.push(UndoEntry::Added(placed));
            }
            DispatchOutcome::default()
        }
        Action::RemoveTop => {
            let position = model.player.position();
            if let Some(top) = model.store.topmost(position).cloned() {
                model.store.remove(&top);
                model.mark_dirty(position);
                model.editor_undo.push(UndoEntry::Removed(vec![top]));
            }
            DispatchOutcome::default()
        }
        Action::Undo => {
            match model.editor_undo.pop() {
                Some(UndoEntry::Added(instances)) => {
                    for instance in instances.iter().rev() {
                        model.store.remove(instance);
                        model.mark_dirty(instance.position());
                    }
                }
                Some(UndoEntry::Removed(instances)) => {
                    for instance in instances {
                        model.mark_dirty(instance.position());
                        model.store.place(instance);
                    }
                }
                None => debug!("Nothing to undo"),
            }
            DispatchOutcome::default()
        }
        Action::NextItem | Action::PrevItem => {
            let len = model.editor_palette.len();
            if len > 0 {
                model.editor_index = if action == Action::NextItem {
                    (model.editor_index + 1) % len
                } else {
                    (model.editor_index + len - 1) % len
                };
            }
            DispatchOutcome::redraw()
        }
        _ => DispatchOutcome::default(),
    }
}

fn dispatch_play(action: Action, model: &mut GameModel) -> DispatchOutcome {
    if action != Action::Interact {
        return DispatchOutcome::default();
    }

    let front = model.player.front();
    if let Some(trunk) = model.store.find_at(front, ids::TREE_TRUNK).cloned() {
        model.store.remove(&trunk);
        let mut removed = vec![trunk];
        let above = Position::new(front.x, front.y - 1);
        if let Some(top) = model.store.find_at(above, ids::TREE_TOP).cloned() {
            model.store.remove(&top);
            model.mark_dirty(above);
            removed.push(top);
        }
        model.player.wood += 1;
        debug!("Chopped tree at ({}, {})", front.x, front.y);
        if model.context.enable_respawn {
            model.respawn_queue.push(RespawnEntry::new(removed));
        }
    }

    if let Some(rock) = model.store.find_at(front, ids::ROCK).cloned() {
        model.store.remove(&rock);
        model.player.stone += 1;
        debug!("Mined rock at ({}, {})", front.x, front.y);
        if model.context.enable_respawn {
            model.respawn_queue.push(RespawnEntry::new(vec![rock]));
        }
    }

    model.action_flash = Some(ActionFlash {
        position: front,
        ticks: 1,
    });
    model.mark_dirty(front);
    DispatchOutcome::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEBUG_WALK_SPEED, RESPAWN_TICKS};
    use crate::game::store::{LayeredTileStore, TileInstance};
    use crate::game::{Facing, Player};
    use crate::rendering::ColorTable;
    use crate::scenes::{MenuState, Scene};
    use crate::TerraResult;
    use std::collections::HashSet;

    #[derive(Default)]
    struct RecordingRenderer {
        answer: bool,
        prompts: Vec<String>,
        quick_saves: usize,
        inventories: usize,
        colors: ColorTable,
    }

    impl Renderer for RecordingRenderer {
        fn visible_size(&self) -> (i32, i32) {
            (20, 10)
        }

        fn render_scene(&mut self, _scene: &mut Scene, _frame: u64, _menu: Option<&MenuState>) -> TerraResult<()> {
            Ok(())
        }

        fn render_frame(&mut self, model: &mut GameModel) -> TerraResult<()> {
            model.dirty.clear();
            Ok(())
        }

        fn prompt_yes_no(&mut self, prompt: &str) -> bool {
            self.prompts.push(prompt.to_string());
            self.answer
        }

        fn prompt_text(&mut self, _prompt: &str) -> Option<String> {
            None
        }

        fn quick_save(&mut self, _model: &mut GameModel) {
            self.quick_saves += 1;
        }

        fn show_inventory(&mut self, _model: &mut GameModel) {
            self.inventories += 1;
        }

        fn colors(&self) -> &ColorTable {
            &self.colors
        }
    }

    fn model_at(x: i32, y: i32) -> GameModel {
        let mut model = GameModel::new(Player::new("Test", Position::new(x, y)), LayeredTileStore::new(), 100, 60);
        model.full_redraw = false;
        model
    }

    #[test]
    fn test_move_marks_exactly_old_and_new_cells() {
        let mut model = model_at(3, 3);
        let mut renderer = RecordingRenderer::default();
        let outcome = dispatch(Action::MoveRight, &mut model, &mut renderer);
        assert!(outcome.moved);
        let expected: HashSet<_> = [Position::new(3, 3), Position::new(4, 3)].into_iter().collect();
        assert_eq!(model.dirty, expected);
    }

    #[test]
    fn test_blocked_move_marks_nothing() {
        let mut model = model_at(3, 3);
        model.store.place(TileInstance::new(3, 2, ids::WALL));
        let outcome = dispatch(Action::MoveUp, &mut model, &mut RecordingRenderer::default());
        assert!(!outcome.moved);
        assert!(model.dirty.is_empty());
        assert_eq!(model.player.facing, Facing::Up);
    }

    #[test]
    fn test_debug_walk_moves_several_cells() {
        let mut model = model_at(0, 0);
        let mut renderer = RecordingRenderer::default();
        dispatch(Action::DebugToggle, &mut model, &mut renderer);
        assert!(model.full_redraw);
        dispatch(Action::MoveDown, &mut model, &mut renderer);
        assert_eq!(model.player.position(), Position::new(0, DEBUG_WALK_SPEED as i32));
    }

    #[test]
    fn test_chop_tree() {
        let mut model = model_at(5, 6);
        model.store.place(TileInstance::new(5, 5, ids::TREE_TRUNK));
        model.store.place(TileInstance::new(5, 4, ids::TREE_TOP));
        model.player.facing = Facing::Up;

        dispatch(Action::Interact, &mut model, &mut RecordingRenderer::default());

        assert_eq!(model.player.wood, 1);
        assert!(!model.store.contains_at(Position::new(5, 5), ids::TREE_TRUNK));
        assert!(!model.store.contains_at(Position::new(5, 4), ids::TREE_TOP));
        assert_eq!(
            model.respawn_queue,
            vec![RespawnEntry {
                countdown_ticks: RESPAWN_TICKS,
                items: vec![
                    TileInstance::new(5, 5, ids::TREE_TRUNK),
                    TileInstance::new(5, 4, ids::TREE_TOP)
                ],
            }]
        );
        assert!(model.dirty.contains(&Position::new(5, 5)));
        assert_eq!(
            model.action_flash,
            Some(ActionFlash {
                position: Position::new(5, 5),
                ticks: 1
            })
        );
    }

    #[test]
    fn test_mine_rock_without_respawn() {
        let mut model = model_at(1, 1);
        model.context.enable_respawn = false;
        model.store.place(TileInstance::new(2, 1, ids::ROCK));
        model.player.facing = Facing::Right;
        dispatch(Action::Interact, &mut model, &mut RecordingRenderer::default());
        assert_eq!(model.player.stone, 1);
        assert!(model.respawn_queue.is_empty());
        assert!(!model.store.is_blocked(Position::new(2, 1)));
    }

    #[test]
    fn test_interact_ignored_in_editor() {
        let mut model = model_at(1, 1);
        model.store.place(TileInstance::new(2, 1, ids::ROCK));
        model.player.facing = Facing::Right;
        model.context.toggle_editor();
        dispatch(Action::Interact, &mut model, &mut RecordingRenderer::default());
        assert_eq!(model.player.stone, 0);
        assert!(model.action_flash.is_none());
    }

    #[test]
    fn test_quit_without_map_asks_once() {
        let mut model = model_at(0, 0);
        let mut renderer = RecordingRenderer {
            answer: true,
            ..Default::default()
        };
        let outcome = dispatch(Action::Quit, &mut model, &mut renderer);
        assert!(outcome.quit_requested);
        assert!(model.should_quit);
        assert_eq!(renderer.prompts, vec!["save generated map?".to_string()]);
        assert_eq!(model.save_on_exit, Some(true));
        assert_eq!(renderer.quick_saves, 0);
    }

    #[test]
    fn test_quit_with_loaded_map_quick_saves() {
        let mut model = model_at(0, 0);
        model.loaded_map_name = Some("island.json".to_string());
        let mut renderer = RecordingRenderer::default();
        dispatch(Action::Quit, &mut model, &mut renderer);
        assert_eq!(renderer.quick_saves, 1);
        assert!(renderer.prompts.is_empty());
        assert!(model.should_quit);
    }

    #[test]
    fn test_editor_toggle_fills_palette() {
        let mut model = model_at(0, 0);
        dispatch(Action::EditorToggle, &mut model, &mut RecordingRenderer::default());
        assert!(model.context.is_editor());
        assert_eq!(model.editor_palette.len(), registry().placeable_ids().len());
        assert!(model.full_redraw);
    }

    #[test]
    fn test_palette_cycles_both_ways() {
        let mut model = model_at(0, 0);
        let mut renderer = RecordingRenderer::default();
        dispatch(Action::EditorToggle, &mut model, &mut renderer);
        let len = model.editor_palette.len();
        dispatch(Action::PrevItem, &mut model, &mut renderer);
        assert_eq!(model.editor_index, len - 1);
        dispatch(Action::NextItem, &mut model, &mut renderer);
        assert_eq!(model.editor_index, 0);
    }

    #[test]
    fn test_remove_top_and_undo() {
        let mut model = model_at(2, 2);
        model.store.place(TileInstance::new(2, 2, ids::GRASS));
        model.store.place(TileInstance::new(2, 2, ids::COIN));
        let before = model.store.clone();
        let mut renderer = RecordingRenderer::default();
        dispatch(Action::EditorToggle, &mut model, &mut renderer);

        dispatch(Action::RemoveTop, &mut model, &mut renderer);
        assert!(!model.store.contains_at(Position::new(2, 2), ids::COIN));
        dispatch(Action::Undo, &mut model, &mut renderer);
        assert_eq!(model.store, before);
        assert!(model.editor_undo.is_empty());
    }

    #[test]
    fn test_place_and_undo_restores_store() {
        let mut model = model_at(2, 10);
        model.store.place(TileInstance::new(2, 10, ids::GRASS));
        for x in 3..=6 {
            model.store.place(TileInstance::new(x, 10, ids::RIVER));
        }
        model.store.place(TileInstance::new(7, 10, ids::GRASS));
        model.player.facing = Facing::Right;
        let before = model.store.clone();

        let mut renderer = RecordingRenderer::default();
        dispatch(Action::EditorToggle, &mut model, &mut renderer);
        model.editor_palette = vec![ids::BRIDGE_TOOL.to_string()];
        model.editor_index = 0;

        dispatch(Action::PlaceItem, &mut model, &mut renderer);
        for x in 3..=6 {
            assert!(model.store.contains_at(Position::new(x, 10), ids::BRIDGE));
        }
        assert!(model.store.contains_at(Position::new(2, 10), ids::BRIDGE_END));
        assert!(model.store.contains_at(Position::new(7, 10), ids::BRIDGE_END));

        dispatch(Action::Undo, &mut model, &mut renderer);
        assert_eq!(model.store, before);
    }

    #[test]
    fn test_show_inventory_and_quick_save_delegate() {
        let mut model = model_at(0, 0);
        let mut renderer = RecordingRenderer::default();
        dispatch(Action::ShowInventory, &mut model, &mut renderer);
        dispatch(Action::SaveQuick, &mut model, &mut renderer);
        assert_eq!(renderer.inventories, 1);
        assert_eq!(renderer.quick_saves, 1);
        assert!(model.full_redraw);
    }
}
