//! # Headless Backend
//!
//! A fixed-size in-memory screen fed by a key script, for tests and for
//! replaying sessions without a terminal.
//!
//! Script format: one or more keys per line. Plain characters are literal
//! keys; named keys are written in angle brackets (`<up>`, `<enter>`, ...).
//! `<idle>` is a frame without input. Blank lines and lines starting with
//! `#` are ignored. Once the script runs out every read returns Escape, so
//! any loop driven by it ends.

use crate::input::Key;
use crate::rendering::{Backend, CellBuffer};
use crate::{TerraError, TerraResult};
use log::trace;
use std::collections::VecDeque;
use std::time::Duration;

/// One entry of a key script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Key(Key),
    /// A frame in which nothing is pressed
    Idle,
}

/// Parses a key script.
///
/// # Examples
///
/// ```
/// use terratile::{parse_script, Key, ScriptStep};
///
/// let steps = parse_script("# walk right\ndd<enter>\n<idle>").unwrap();
/// assert_eq!(steps, vec![
///     ScriptStep::Key(Key::Char('d')),
///     ScriptStep::Key(Key::Char('d')),
///     ScriptStep::Key(Key::Enter),
///     ScriptStep::Idle,
/// ]);
/// ```
pub fn parse_script(text: &str) -> TerraResult<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut chars = line.chars();
        while let Some(ch) = chars.next() {
            if ch != '<' {
                steps.push(ScriptStep::Key(Key::Char(ch)));
                continue;
            }
            let name: String = chars.by_ref().take_while(|&c| c != '>').collect();
            steps.push(named_step(&name).ok_or_else(|| {
                TerraError::InvalidAction(format!("unknown key <{}> on script line {}", name, number + 1))
            })?);
        }
    }
    Ok(steps)
}

fn named_step(name: &str) -> Option<ScriptStep> {
    let key = match name.to_ascii_lowercase().as_str() {
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "enter" => Key::Enter,
        "esc" => Key::Escape,
        "del" => Key::Delete,
        "bs" => Key::Backspace,
        "tab" => Key::Tab,
        "space" => Key::Char(' '),
        "lt" => Key::Char('<'),
        "idle" => return Some(ScriptStep::Idle),
        _ => return None,
    };
    Some(ScriptStep::Key(key))
}

/// In-memory backend replaying a key script.
#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    buffer: CellBuffer,
    script: VecDeque<ScriptStep>,
    presented: usize,
}

impl HeadlessBackend {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            buffer: CellBuffer::new(width, height),
            script: VecDeque::new(),
            presented: 0,
        }
    }

    /// Appends steps to the script, builder style.
    pub fn with_script(mut self, steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        self.script.extend(steps);
        self
    }

    /// Backend whose script is parsed from `text`.
    pub fn from_script_text(width: i32, height: i32, text: &str) -> TerraResult<Self> {
        Ok(Self::new(width, height).with_script(parse_script(text)?))
    }

    /// Steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Backend for HeadlessBackend {
    fn buffer_mut(&mut self) -> &mut CellBuffer {
        &mut self.buffer
    }

    fn buffer(&self) -> &CellBuffer {
        &self.buffer
    }

    fn present(&mut self) -> TerraResult<()> {
        self.presented += 1;
        Ok(())
    }

    fn read_key(&mut self) -> TerraResult<Key> {
        while let Some(step) = self.script.pop_front() {
            if let ScriptStep::Key(key) = step {
                trace!("Script key {:?}", key);
                return Ok(key);
            }
        }
        Ok(Key::Escape)
    }

    fn pending_keys(&mut self, max: usize) -> TerraResult<Vec<Key>> {
        if self.script.is_empty() {
            return Ok(vec![Key::Escape]);
        }
        if self.script.front() == Some(&ScriptStep::Idle) {
            self.script.pop_front();
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        while keys.len() < max {
            match self.script.front() {
                Some(&ScriptStep::Key(key)) => {
                    keys.push(key);
                    self.script.pop_front();
                }
                _ => break,
            }
        }
        Ok(keys)
    }

    fn pace(&mut self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let steps = parse_script("\n  # setup\n  a <space>\n\n").unwrap();
        assert_eq!(
            steps,
            vec![
                ScriptStep::Key(Key::Char('a')),
                ScriptStep::Key(Key::Char(' ')),
                ScriptStep::Key(Key::Char(' ')),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert!(parse_script("<warp>").is_err());
        assert_eq!(parse_script("<ESC><lt>").unwrap(), vec![
            ScriptStep::Key(Key::Escape),
            ScriptStep::Key(Key::Char('<')),
        ]);
    }

    #[test]
    fn test_pending_keys_batches_until_idle() {
        let mut backend = HeadlessBackend::from_script_text(10, 5, "abc<idle>d").unwrap();
        assert_eq!(backend.pending_keys(2).unwrap(), vec![Key::Char('a'), Key::Char('b')]);
        assert_eq!(backend.pending_keys(5).unwrap(), vec![Key::Char('c')]);
        assert!(backend.pending_keys(5).unwrap().is_empty());
        assert_eq!(backend.pending_keys(5).unwrap(), vec![Key::Char('d')]);
        assert_eq!(backend.pending_keys(5).unwrap(), vec![Key::Escape]);
    }

    #[test]
    fn test_read_key_skips_idle_and_ends_with_escape() {
        let mut backend = HeadlessBackend::from_script_text(10, 5, "<idle>x").unwrap();
        assert_eq!(backend.read_key().unwrap(), Key::Char('x'));
        assert_eq!(backend.read_key().unwrap(), Key::Escape);
        assert_eq!(backend.remaining(), 0);
    }
}
