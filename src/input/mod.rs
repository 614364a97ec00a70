//! # Input Module
//!
//! Frontend-agnostic key codes and the fixed key-to-action table.
//!
//! Frontends translate their native events into [`Key`]s; everything above
//! the frontend works with [`Action`]s only.

use crate::game::Facing;
use crate::TerraResult;
use std::fmt;

/// A key press as seen by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
}

/// High-level commands understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Interact,
    EditorToggle,
    SaveQuick,
    DebugToggle,
    PlaceItem,
    RemoveTop,
    Undo,
    NextItem,
    PrevItem,
    ShowInventory,
    Quit,
}

impl Action {
    /// Stable upper-case name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::MoveUp => "MOVE_UP",
            Action::MoveDown => "MOVE_DOWN",
            Action::MoveLeft => "MOVE_LEFT",
            Action::MoveRight => "MOVE_RIGHT",
            Action::Interact => "INTERACT",
            Action::EditorToggle => "EDITOR_TOGGLE",
            Action::SaveQuick => "SAVE_QUICK",
            Action::DebugToggle => "DEBUG_TOGGLE",
            Action::PlaceItem => "PLACE_ITEM",
            Action::RemoveTop => "REMOVE_TOP",
            Action::Undo => "UNDO",
            Action::NextItem => "NEXT_ITEM",
            Action::PrevItem => "PREV_ITEM",
            Action::ShowInventory => "SHOW_INVENTORY",
            Action::Quit => "QUIT",
        }
    }

    /// Direction of a movement action.
    pub fn movement(self) -> Option<Facing> {
        match self {
            Action::MoveUp => Some(Facing::Up),
            Action::MoveDown => Some(Facing::Down),
            Action::MoveLeft => Some(Facing::Left),
            Action::MoveRight => Some(Facing::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a key to its action. Unmapped keys yield `None`.
///
/// `y` and `Y` are left unmapped; they belong to yes/no prompts.
///
/// # Examples
///
/// ```
/// use terratile::{map_key, Action, Key};
///
/// assert_eq!(map_key(Key::Char('w')), Some(Action::MoveUp));
/// assert_eq!(map_key(Key::Escape), Some(Action::Quit));
/// assert_eq!(map_key(Key::Char('y')), None);
/// ```
pub fn map_key(key: Key) -> Option<Action> {
    match key {
        Key::Up | Key::Char('w') | Key::Char('W') => Some(Action::MoveUp),
        Key::Down | Key::Char('s') | Key::Char('S') => Some(Action::MoveDown),
        Key::Left | Key::Char('a') | Key::Char('A') => Some(Action::MoveLeft),
        Key::Right | Key::Char('d') | Key::Char('D') => Some(Action::MoveRight),
        Key::Char(' ') => Some(Action::Interact),
        Key::Char('e') => Some(Action::EditorToggle),
        Key::Char('o') => Some(Action::SaveQuick),
        Key::Char('v') => Some(Action::DebugToggle),
        Key::Char('p') => Some(Action::PlaceItem),
        Key::Char('x') => Some(Action::RemoveTop),
        Key::Char('u') => Some(Action::Undo),
        Key::Char('l') => Some(Action::NextItem),
        Key::Char('k') => Some(Action::PrevItem),
        Key::Char('i') => Some(Action::ShowInventory),
        Key::Char('q') | Key::Escape => Some(Action::Quit),
        _ => None,
    }
}

/// Source of player input.
pub trait InputSource {
    /// Drains pending keys without blocking, at most a small batch per call.
    fn poll_keys(&mut self) -> TerraResult<Vec<Key>>;

    /// Drains pending keys and maps them to actions, dropping unmapped keys.
    fn poll_actions(&mut self) -> TerraResult<Vec<Action>> {
        Ok(self.poll_keys()?.into_iter().filter_map(map_key).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        assert_eq!(map_key(Key::Up), Some(Action::MoveUp));
        assert_eq!(map_key(Key::Char('s')), Some(Action::MoveDown));
        assert_eq!(map_key(Key::Char('a')), Some(Action::MoveLeft));
        assert_eq!(map_key(Key::Right), Some(Action::MoveRight));
        assert_eq!(Action::MoveLeft.movement(), Some(Facing::Left));
        assert_eq!(Action::Quit.movement(), None);
    }

    #[test]
    fn test_editor_keys() {
        let table = [
            ('e', Action::EditorToggle),
            ('o', Action::SaveQuick),
            ('v', Action::DebugToggle),
            ('p', Action::PlaceItem),
            ('x', Action::RemoveTop),
            ('u', Action::Undo),
            ('l', Action::NextItem),
            ('k', Action::PrevItem),
            ('i', Action::ShowInventory),
            ('q', Action::Quit),
            (' ', Action::Interact),
        ];
        for (ch, action) in table {
            assert_eq!(map_key(Key::Char(ch)), Some(action), "key {:?}", ch);
        }
    }

    #[test]
    fn test_prompt_keys_are_unmapped() {
        assert_eq!(map_key(Key::Char('y')), None);
        assert_eq!(map_key(Key::Char('Y')), None);
        assert_eq!(map_key(Key::Enter), None);
        assert_eq!(map_key(Key::Char('z')), None);
    }

    struct Scripted(Vec<Key>);

    impl InputSource for Scripted {
        fn poll_keys(&mut self) -> TerraResult<Vec<Key>> {
            Ok(std::mem::take(&mut self.0))
        }
    }

    #[test]
    fn test_poll_actions_drops_unmapped() -> TerraResult<()> {
        let mut source = Scripted(vec![Key::Char('d'), Key::Char('y'), Key::Char(' ')]);
        assert_eq!(source.poll_actions()?, vec![Action::MoveRight, Action::Interact]);
        assert!(source.poll_actions()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_action_names() {
        assert_eq!(Action::ShowInventory.to_string(), "SHOW_INVENTORY");
        assert_eq!(Action::MoveUp.as_str(), "MOVE_UP");
    }
}
