use crate::common::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Floor,
    Box,
}

impl Cell {
    pub fn symbol(self) -> char {
        match self {
            Cell::Floor => '.',
            Cell::Box => '0',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Cell::Floor),
            '0' => Some(Cell::Box),
            _ => None,
        }
    }
}

/// Rectangular cell matrix, row-major. Dimensions never change after
/// construction; the only mutation is a box turning into floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// An all-floor grid.
    pub fn empty(width: i32, height: i32) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width: width.max(0),
            height: height.max(0),
            cells: vec![Cell::Floor; len],
        }
    }

    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> DomainResult<Self> {
        let width = rows
            .first()
            .map(|row| row.as_ref().chars().count())
            .ok_or_else(|| DomainError::InvalidLayout {
                reason: "layout has no rows".to_string(),
            })?;
        if width == 0 {
            return Err(DomainError::InvalidLayout {
                reason: "layout rows are empty".to_string(),
            });
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(DomainError::InvalidLayout {
                    reason: format!("row {} has {} cells, expected {}", y, row.chars().count(), width),
                });
            }
            for (x, symbol) in row.chars().enumerate() {
                let cell = Cell::from_symbol(symbol).ok_or_else(|| DomainError::InvalidLayout {
                    reason: format!("unknown cell '{}' at ({}, {})", symbol, x, y),
                })?;
                cells.push(cell);
            }
        }

        Ok(Self {
            width: width as i32,
            height: rows.len() as i32,
            cells,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        0 <= x && x < self.width && 0 <= y && y < self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        self.in_bounds(position.x, position.y)
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    pub fn is_box(&self, x: i32, y: i32) -> bool {
        self.cell(x, y) == Some(Cell::Box)
    }

    /// Turns a box into floor. Returns whether there was a box to clear.
    pub fn clear_box(&mut self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(i) if self.cells[i] == Cell::Box => {
                self.cells[i] = Cell::Floor;
                true
            }
            _ => false,
        }
    }

    pub fn place_box(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell::Box;
        }
    }

    pub fn box_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell == Cell::Box).count()
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<String> = self.rows().collect();
        write!(f, "{}", rows.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_counts_boxes() {
        let grid = Grid::from_rows(&["..0", "0.."]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert!(grid.is_box(2, 0));
        assert!(grid.is_box(0, 1));
        assert!(!grid.is_box(1, 1));
        assert_eq!(grid.box_count(), 2);
        assert_eq!(grid.to_string(), "..0\n0..");
    }

    #[test]
    fn rejects_ragged_or_unknown_cells() {
        assert!(matches!(
            Grid::from_rows(&["...", ".."]),
            Err(DomainError::InvalidLayout { .. })
        ));
        assert!(matches!(
            Grid::from_rows(&["..X"]),
            Err(DomainError::InvalidLayout { .. })
        ));
        let empty: [&str; 0] = [];
        assert!(Grid::from_rows(&empty).is_err());
    }

    #[test]
    fn box_queries_are_false_outside_bounds() {
        let grid = Grid::empty(4, 4);
        assert!(!grid.in_bounds(-1, 0));
        assert!(!grid.in_bounds(0, 4));
        assert!(!grid.is_box(-1, -1));
        assert_eq!(grid.cell(4, 0), None);
    }

    #[test]
    fn clear_box_is_idempotent() {
        let mut grid = Grid::from_rows(&[".0."]).unwrap();
        assert!(grid.clear_box(1, 0));
        assert!(!grid.clear_box(1, 0));
        assert!(!grid.clear_box(7, 7));
        assert_eq!(grid.box_count(), 0);
    }
}
