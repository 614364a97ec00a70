//! # Cell Buffer
//!
//! In-memory character grid. Frontends compose every frame into one and the
//! terminal frontend diffs it against the previous frame before writing.

use crate::rendering::{Style, Surface};

/// One character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

/// Row-major grid of [`Cell`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct CellBuffer {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl CellBuffer {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![Cell::default(); (width * height) as usize],
        }
    }

    /// Resizes, blanking the contents only when the dimensions change.
    /// Returns whether they changed.
    pub fn resize(&mut self, width: i32, height: i32) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        *self = Self::new(width, height);
        true
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.width || row >= self.height {
            return None;
        }
        Some((row * self.width + col) as usize)
    }

    pub fn get(&self, col: i32, row: i32) -> Option<&Cell> {
        self.index(col, row).map(|index| &self.cells[index])
    }

    /// Fills every cell with a value no real frame produces, so the next
    /// diff repaints everything.
    pub fn invalidate(&mut self) {
        let sentinel = Cell {
            ch: '\u{0}',
            style: Style::default(),
        };
        self.cells.fill(sentinel);
    }

    /// Characters of one row, without styling.
    pub fn row_text(&self, row: i32) -> String {
        (0..self.width)
            .filter_map(|col| self.get(col, row))
            .map(|cell| cell.ch)
            .collect()
    }

    /// Whole grid as text, one line per row.
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|row| self.row_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Cells that differ from `previous`, in row-major order.
    ///
    /// A buffer of a different size counts as entirely changed.
    pub fn diff<'a>(&'a self, previous: &'a CellBuffer) -> impl Iterator<Item = (i32, i32, &'a Cell)> + 'a {
        let same_size = previous.width == self.width && previous.height == self.height;
        self.cells.iter().enumerate().filter_map(move |(index, cell)| {
            if same_size && previous.cells[index] == *cell {
                return None;
            }
            let index = index as i32;
            Some((index % self.width, index / self.width, cell))
        })
    }
}

impl Surface for CellBuffer {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn set_cell(&mut self, col: i32, row: i32, ch: char, style: Style) {
        if let Some(index) = self.index(col, row) {
            self.cells[index] = Cell { ch, style };
        }
    }
}
