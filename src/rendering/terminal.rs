//! # Terminal Backend
//!
//! crossterm-based backend. Frames are composed into a back buffer and only
//! the cells that changed since the last present are written out.

use crate::input::Key;
use crate::rendering::{Backend, CellBuffer, Rgb};
use crate::TerraResult;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use log::{debug, info, warn};
use std::io::{self, Stdout, Write};
use std::time::Duration;

/// Raw-mode alternate-screen terminal.
///
/// The terminal is restored when the backend is dropped.
#[derive(Debug)]
pub struct TerminalBackend {
    stdout: Stdout,
    back: CellBuffer,
    front: CellBuffer,
    active: bool,
}

impl TerminalBackend {
    /// Switches the terminal into raw mode on the alternate screen.
    pub fn new() -> TerraResult<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        let (cols, rows) = terminal::size()?;
        info!("Terminal opened at {}x{}", cols, rows);

        let mut front = CellBuffer::new(cols as i32, rows as i32);
        front.invalidate();
        Ok(Self {
            stdout,
            back: CellBuffer::new(cols as i32, rows as i32),
            front,
            active: true,
        })
    }

    /// Leaves raw mode and the alternate screen. Safe to call twice.
    pub fn restore(&mut self) -> TerraResult<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(self.stdout, SetAttribute(Attribute::Reset), Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        debug!("Terminal restored");
        Ok(())
    }
}

impl Drop for TerminalBackend {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!("Could not restore terminal: {}", err);
        }
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Translates a crossterm key event. Ctrl+C reads as Escape.
fn to_key(event: KeyEvent) -> Option<Key> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
        return Some(Key::Escape);
    }
    let key = match event.code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Tab => Key::Tab,
        _ => return None,
    };
    Some(key)
}

impl Backend for TerminalBackend {
    fn buffer_mut(&mut self) -> &mut CellBuffer {
        &mut self.back
    }

    fn buffer(&self) -> &CellBuffer {
        &self.back
    }

    fn refresh_size(&mut self) -> TerraResult<bool> {
        let (cols, rows) = terminal::size()?;
        if !self.back.resize(cols as i32, rows as i32) {
            return Ok(false);
        }
        debug!("Terminal resized to {}x{}", cols, rows);
        self.front = CellBuffer::new(cols as i32, rows as i32);
        self.front.invalidate();
        queue!(self.stdout, Clear(ClearType::All))?;
        Ok(true)
    }

    fn present(&mut self) -> TerraResult<()> {
        let mut current = None;
        for (col, row, cell) in self.back.diff(&self.front) {
            queue!(self.stdout, MoveTo(col as u16, row as u16))?;
            if current != Some(cell.style) {
                let weight = if cell.style.bold { Attribute::Bold } else { Attribute::NormalIntensity };
                queue!(
                    self.stdout,
                    SetForegroundColor(to_color(cell.style.fg)),
                    SetBackgroundColor(to_color(cell.style.bg)),
                    SetAttribute(weight)
                )?;
                current = Some(cell.style);
            }
            queue!(self.stdout, Print(cell.ch))?;
        }
        self.stdout.flush()?;
        self.front.clone_from(&self.back);
        Ok(())
    }

    fn read_key(&mut self) -> TerraResult<Key> {
        loop {
            if let Event::Key(event) = event::read()? {
                if let Some(key) = to_key(event) {
                    return Ok(key);
                }
            }
        }
    }

    fn pending_keys(&mut self, max: usize) -> TerraResult<Vec<Key>> {
        let mut keys = Vec::new();
        while keys.len() < max && event::poll(Duration::ZERO)? {
            if let Event::Key(event) = event::read()? {
                keys.extend(to_key(event));
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_key_translation() {
        assert_eq!(to_key(press(KeyCode::Char('w'), KeyModifiers::NONE)), Some(Key::Char('w')));
        assert_eq!(to_key(press(KeyCode::Esc, KeyModifiers::NONE)), Some(Key::Escape));
        assert_eq!(to_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(Key::Escape));
        assert_eq!(to_key(press(KeyCode::F(5), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_releases_are_ignored() {
        let mut release = press(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(to_key(release), None);
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(to_color(Rgb::new(1, 2, 3)), Color::Rgb { r: 1, g: 2, b: 3 });
    }
}
