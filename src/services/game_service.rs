use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::db::store::BingoStore;
use crate::error::{BingoError, BingoResult};
use crate::models::board::{BingoGame, GameCategory, GameOverview, GameSummary, PlayerStanding, BOARD_SIZE};

const RECENT_GAMES_DAYS: i64 = 7;

fn has_duplicates<T: Eq + Hash>(items: &[T]) -> bool {
    items.iter().collect::<HashSet<_>>().len() != items.len()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGame {
    pub title: String,
    /// Board columns, left to right
    pub category_ids: Vec<Uuid>,
    pub sport_event_ids: Vec<Uuid>,
    /// Defaults to every catalog pattern in catalog order
    #[serde(default)]
    pub pattern_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub reroll_allowance: Option<i32>,
}

pub struct GameService {
    store: Arc<dyn BingoStore>,
    default_reroll_allowance: i32,
}

impl GameService {
    pub fn new(store: Arc<dyn BingoStore>, default_reroll_allowance: i32) -> Self {
        Self {
            store,
            default_reroll_allowance,
        }
    }

    #[tracing::instrument(name = "Create bingo game", skip(self, request), fields(title = %request.title))]
    pub async fn create_game(&self, request: NewGame) -> BingoResult<BingoGame> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(BingoError::InvalidData("title must not be empty".to_string()));
        }
        let reroll_allowance = request.reroll_allowance.unwrap_or(self.default_reroll_allowance);
        if reroll_allowance < 0 {
            return Err(BingoError::InvalidData("reroll_allowance must not be negative".to_string()));
        }
        if request.category_ids.len() != BOARD_SIZE {
            return Err(BingoError::InvalidData(format!(
                "a game needs exactly {} categories, got {}",
                BOARD_SIZE,
                request.category_ids.len()
            )));
        }
        if has_duplicates(&request.category_ids) {
            return Err(BingoError::InvalidData("categories must be distinct".to_string()));
        }
        for category_id in &request.category_ids {
            if self.store.get_templates_for_category(*category_id).await?.is_empty() {
                return Err(BingoError::InvalidData(format!(
                    "category {} has no square templates",
                    category_id
                )));
            }
        }

        if has_duplicates(&request.sport_event_ids) {
            return Err(BingoError::InvalidData("sport events must be distinct".to_string()));
        }
        let found = self.store.get_sport_events(&request.sport_event_ids).await?;
        if found.len() != request.sport_event_ids.len() {
            return Err(BingoError::NotFound(format!(
                "{} of the requested sport events",
                request.sport_event_ids.len() - found.len()
            )));
        }

        let pattern_ids = match request.pattern_ids {
            Some(ids) => ids,
            None => self.store.list_pattern_ids().await?,
        };
        if pattern_ids.is_empty() {
            return Err(BingoError::InvalidData("a game needs at least one pattern".to_string()));
        }
        if has_duplicates(&pattern_ids) {
            return Err(BingoError::InvalidData("patterns must be distinct".to_string()));
        }
        let patterns = self.store.get_patterns(&pattern_ids).await?;
        if patterns.len() != pattern_ids.len() {
            return Err(BingoError::NotFound(format!(
                "{} of the requested patterns",
                pattern_ids.len() - patterns.len()
            )));
        }

        let game = BingoGame {
            id: Uuid::new_v4(),
            title: title.to_string(),
            reroll_allowance,
            categories: request
                .category_ids
                .iter()
                .enumerate()
                .map(|(category_index, category_id)| GameCategory {
                    category_id: *category_id,
                    category_index,
                })
                .collect(),
            sport_event_ids: request.sport_event_ids,
            pattern_ids,
        };
        game.validate()?;
        self.store.create_game(&game).await?;

        info!("✅ Created game '{}' with {} sport events", game.title, game.sport_event_ids.len());
        Ok(game)
    }

    pub async fn get_game(&self, game_id: Uuid) -> BingoResult<BingoGame> {
        self.store.get_game(game_id).await
    }

    /// Games created in the last week
    pub async fn list_recent_games(&self) -> BingoResult<Vec<GameSummary>> {
        self.store
            .list_games_since(Utc::now() - Duration::days(RECENT_GAMES_DAYS))
            .await
    }

    /// Standings of every player in the game
    pub async fn get_game_overview(&self, game_id: Uuid) -> BingoResult<GameOverview> {
        let game = self.store.get_game(game_id).await?;
        let boards = self.store.list_boards(game_id).await?;

        let ids: Vec<Uuid> = boards
            .iter()
            .flat_map(|b| b.squares.iter().map(|s| s.resolved_square_id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let occurred: HashMap<Uuid, bool> = self
            .store
            .get_squares(&ids)
            .await?
            .iter()
            .map(|s| (s.id, s.has_occurred()))
            .collect();

        let mut players: Vec<PlayerStanding> = boards
            .iter()
            .map(|board| PlayerStanding {
                player_id: board.player_id,
                squares_active: board
                    .squares
                    .iter()
                    .filter(|s| occurred.get(&s.resolved_square_id).copied().unwrap_or(false))
                    .count(),
                has_bingo: board.won_pattern_id.is_some(),
                won_pattern_id: board.won_pattern_id,
            })
            .collect();
        players.sort_by(|a, b| {
            b.squares_active
                .cmp(&a.squares_active)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        Ok(GameOverview {
            anyone_has_bingo: players.iter().any(|p| p.has_bingo),
            game,
            players,
        })
    }
}
