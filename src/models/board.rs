use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BingoError;
use crate::models::square::SquareSnapshot;

pub const BOARD_SIZE: usize = 5;
pub const SQUARES_PER_BOARD: usize = BOARD_SIZE * BOARD_SIZE;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// A category placed in one column of a game's board
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct GameCategory {
    pub category_id: Uuid,
    pub category_index: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BingoGame {
    pub id: Uuid,
    pub title: String,
    pub reroll_allowance: i32,
    /// Ordered by `category_index`
    pub categories: Vec<GameCategory>,
    pub sport_event_ids: Vec<Uuid>,
    /// Catalog order; the first winning pattern in this order is awarded
    pub pattern_ids: Vec<Uuid>,
}

impl BingoGame {
    pub fn category_index(&self, category_id: Uuid) -> Option<usize> {
        self.categories
            .iter()
            .find(|c| c.category_id == category_id)
            .map(|c| c.category_index)
    }

    pub fn validate(&self) -> Result<(), BingoError> {
        if self.categories.len() != BOARD_SIZE {
            return Err(BingoError::InvalidData(format!(
                "game {} has {} categories, expected {}",
                self.id,
                self.categories.len(),
                BOARD_SIZE
            )));
        }
        let mut seen = [false; BOARD_SIZE];
        for category in &self.categories {
            match seen.get_mut(category.category_index) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(BingoError::InvalidData(format!(
                        "game {} has invalid category index {}",
                        self.id, category.category_index
                    )))
                }
            }
        }
        if self.sport_event_ids.is_empty() {
            return Err(BingoError::InvalidData(format!(
                "game {} has no sport events",
                self.id
            )));
        }
        Ok(())
    }
}

/// One slot of a player's board
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerSquare {
    pub category_id: Uuid,
    pub square_index: usize,
    pub resolved_square_id: Uuid,
    /// Player-wide budget, mirrored on every slot of the board
    pub rerolls_left: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerBoard {
    pub player_id: Uuid,
    pub game_id: Uuid,
    pub won_pattern_id: Option<Uuid>,
    pub squares: Vec<PlayerSquare>,
}

impl PlayerBoard {
    pub fn rerolls_left(&self) -> i32 {
        self.squares.iter().map(|s| s.rerolls_left).min().unwrap_or(0)
    }

    pub fn slot(&self, category_id: Uuid, square_index: usize) -> Option<&PlayerSquare> {
        self.squares
            .iter()
            .find(|s| s.category_id == category_id && s.square_index == square_index)
    }
}

/// Board as shown to a player: squares placed on the grid
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BoardView {
    pub player_id: Uuid,
    pub game_id: Uuid,
    pub rerolls_left: i32,
    pub won_pattern_id: Option<Uuid>,
    pub cells: Vec<BoardCell>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BoardCell {
    pub x: usize,
    pub y: usize,
    pub category_id: Uuid,
    pub square: SquareSnapshot,
}

/// A game in a listing, with how many players hold a board
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub player_count: usize,
}

/// One player's standing in a game
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerStanding {
    pub player_id: Uuid,
    pub squares_active: usize,
    pub has_bingo: bool,
    pub won_pattern_id: Option<Uuid>,
}

/// Game with its players ordered by active squares, most first
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GameOverview {
    pub game: BingoGame,
    pub players: Vec<PlayerStanding>,
    pub anyone_has_bingo: bool,
}
