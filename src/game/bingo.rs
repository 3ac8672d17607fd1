use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{BingoError, BingoResult};
use crate::models::board::{BingoGame, PlayerBoard, BOARD_SIZE};
use crate::models::pattern::{BingoPattern, PatternLine};
use crate::models::square::ResolvedSquare;

/// `cells[x][y]`: whether the square in category column `x`, row `y` occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardGrid {
    cells: [[bool; BOARD_SIZE]; BOARD_SIZE],
}

impl BoardGrid {
    pub fn from_cells(cells: [[bool; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// Places a board's squares on the grid using the game's category columns
    pub fn from_board(
        game: &BingoGame,
        board: &PlayerBoard,
        squares: &[ResolvedSquare],
    ) -> BingoResult<Self> {
        let by_id: HashMap<Uuid, &ResolvedSquare> = squares.iter().map(|s| (s.id, s)).collect();
        let mut grid = Self::default();
        for slot in &board.squares {
            let x = game.category_index(slot.category_id).ok_or_else(|| {
                BingoError::InvalidData(format!(
                    "category {} is not part of game {}",
                    slot.category_id, game.id
                ))
            })?;
            if x >= BOARD_SIZE || slot.square_index >= BOARD_SIZE {
                return Err(BingoError::InvalidData(format!(
                    "slot ({}, {}) is off the board",
                    x, slot.square_index
                )));
            }
            let square = by_id.get(&slot.resolved_square_id).ok_or_else(|| {
                BingoError::NotFound(format!("square {}", slot.resolved_square_id))
            })?;
            grid.cells[x][slot.square_index] = square.has_occurred();
        }
        Ok(grid)
    }

    pub fn is_resolved(&self, x: usize, y: usize) -> bool {
        self.cells
            .get(x)
            .and_then(|column| column.get(y))
            .copied()
            .unwrap_or(false)
    }

    pub fn line_complete(&self, line: &PatternLine) -> bool {
        line.coords().iter().all(|c| self.is_resolved(c.x, c.y))
    }
}

pub fn pattern_wins(grid: &BoardGrid, pattern: &BingoPattern) -> bool {
    pattern.lines.iter().any(|line| grid.line_complete(line))
}

/// First winning pattern in catalog order
pub fn first_winning_pattern<'a>(
    grid: &BoardGrid,
    patterns: &'a [BingoPattern],
) -> Option<&'a BingoPattern> {
    patterns.iter().find(|pattern| pattern_wins(grid, pattern))
}

/// Rows, columns and both diagonals
pub fn standard_lines() -> BingoResult<Vec<PatternLine>> {
    let mut lines = Vec::with_capacity(2 * BOARD_SIZE + 2);
    for i in 0..BOARD_SIZE {
        let row: Vec<(usize, usize)> = (0..BOARD_SIZE).map(|x| (x, i)).collect();
        let column: Vec<(usize, usize)> = (0..BOARD_SIZE).map(|y| (i, y)).collect();
        lines.push(PatternLine::from_pairs(&row)?);
        lines.push(PatternLine::from_pairs(&column)?);
    }
    let diagonal: Vec<(usize, usize)> = (0..BOARD_SIZE).map(|i| (i, i)).collect();
    let anti: Vec<(usize, usize)> = (0..BOARD_SIZE).map(|i| (i, BOARD_SIZE - 1 - i)).collect();
    lines.push(PatternLine::from_pairs(&diagonal)?);
    lines.push(PatternLine::from_pairs(&anti)?);
    Ok(lines)
}
