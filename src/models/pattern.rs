use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BingoError;
use crate::models::board::{BOARD_SIZE, SQUARES_PER_BOARD};

/// `x` is the category column, `y` the square row
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub x: usize,
    pub y: usize,
}

impl GridCoord {
    pub fn new(x: usize, y: usize) -> Result<Self, BingoError> {
        if x >= BOARD_SIZE || y >= BOARD_SIZE {
            return Err(BingoError::InvalidData(format!(
                "coordinate ({}, {}) is off the board",
                x, y
            )));
        }
        Ok(Self { x, y })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "Vec<GridCoord>", into = "Vec<GridCoord>")]
pub struct PatternLine {
    coords: Vec<GridCoord>,
}

impl PatternLine {
    pub fn new(coords: Vec<GridCoord>) -> Result<Self, BingoError> {
        if coords.is_empty() || coords.len() > SQUARES_PER_BOARD {
            return Err(BingoError::InvalidData(format!(
                "a pattern line needs 1 to {} coordinates, got {}",
                SQUARES_PER_BOARD,
                coords.len()
            )));
        }
        if let Some(bad) = coords.iter().find(|c| c.x >= BOARD_SIZE || c.y >= BOARD_SIZE) {
            return Err(BingoError::InvalidData(format!(
                "coordinate ({}, {}) is off the board",
                bad.x, bad.y
            )));
        }
        Ok(Self { coords })
    }

    pub fn from_pairs(pairs: &[(usize, usize)]) -> Result<Self, BingoError> {
        let coords = pairs
            .iter()
            .map(|&(x, y)| GridCoord::new(x, y))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(coords)
    }

    pub fn coords(&self) -> &[GridCoord] {
        &self.coords
    }
}

impl TryFrom<Vec<GridCoord>> for PatternLine {
    type Error = BingoError;

    fn try_from(coords: Vec<GridCoord>) -> Result<Self, Self::Error> {
        Self::new(coords)
    }
}

impl From<PatternLine> for Vec<GridCoord> {
    fn from(line: PatternLine) -> Self {
        line.coords
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BingoPattern {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub lines: Vec<PatternLine>,
}
