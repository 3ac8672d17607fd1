//! In-process `BingoStore` used by tests and local runs without Postgres.
//!
//! Every operation takes the single state lock once, so the unit-of-work
//! operations are atomic just like their transactional counterparts.
//! Failures can be injected per player or per sport event to exercise
//! isolation in batch code; `clear_failures` lifts all of them.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::db::store::{BingoStore, BoardKey, EventSquares, SlotReplacement};
use crate::error::{BingoError, BingoResult};
use crate::game::catalog::Catalog;
use crate::models::board::{BingoGame, Category, GameSummary, PlayerBoard};
use crate::models::pattern::BingoPattern;
use crate::models::play::GameClock;
use crate::models::sport_event::SportEvent;
use crate::models::square::{ResolvedSquare, SquareTemplate};

#[derive(Debug, Default)]
struct State {
    categories: HashMap<Uuid, Category>,
    templates: HashMap<Uuid, SquareTemplate>,
    patterns: Vec<BingoPattern>,
    games: HashMap<Uuid, BingoGame>,
    game_created_at: HashMap<Uuid, DateTime<Utc>>,
    sport_events: HashMap<Uuid, SportEvent>,
    squares: HashMap<Uuid, ResolvedSquare>,
    boards: HashMap<BoardKey, PlayerBoard>,
    failing_board_reads: HashSet<Uuid>,
    failing_commits: HashSet<Uuid>,
    /// Replacements per player that still report a conflict
    conflicting_replacements: HashMap<Uuid, u32>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every board read of `player_id` fail until cleared
    pub fn fail_board_reads_for(&self, player_id: Uuid) {
        self.state().failing_board_reads.insert(player_id);
    }

    /// Makes committing evaluations of `sport_event_id` fail until cleared
    pub fn fail_commits_for(&self, sport_event_id: Uuid) {
        self.state().failing_commits.insert(sport_event_id);
    }

    /// Makes the next `times` slot replacements of `player_id` fail with a conflict,
    /// as if another writer had moved the slot
    pub fn conflict_replacements_for(&self, player_id: Uuid, times: u32) {
        self.state().conflicting_replacements.insert(player_id, times);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.failing_board_reads.clear();
        state.failing_commits.clear();
        state.conflicting_replacements.clear();
    }

    pub fn square_count(&self) -> usize {
        self.state().squares.len()
    }

    fn check_board_read(state: &State, key: BoardKey) -> BingoResult<()> {
        if state.failing_board_reads.contains(&key.player_id) {
            return Err(BingoError::InvalidData(format!(
                "injected board read failure for player {}",
                key.player_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl BingoStore for InMemoryStore {
    async fn get_game(&self, game_id: Uuid) -> BingoResult<BingoGame> {
        self.state()
            .games
            .get(&game_id)
            .cloned()
            .ok_or_else(|| BingoError::NotFound(format!("game {}", game_id)))
    }

    async fn create_game(&self, game: &BingoGame) -> BingoResult<()> {
        let mut state = self.state();
        if state.games.contains_key(&game.id) {
            return Err(BingoError::PersistenceConflict(format!("game {} exists", game.id)));
        }
        state.games.insert(game.id, game.clone());
        state.game_created_at.insert(game.id, Utc::now());
        Ok(())
    }

    async fn list_games_since(&self, since: DateTime<Utc>) -> BingoResult<Vec<GameSummary>> {
        let state = self.state();
        let mut games: Vec<GameSummary> = state
            .games
            .values()
            .filter_map(|game| {
                let created_at = *state.game_created_at.get(&game.id)?;
                (created_at >= since).then(|| GameSummary {
                    id: game.id,
                    title: game.title.clone(),
                    created_at,
                    player_count: state.boards.keys().filter(|k| k.game_id == game.id).count(),
                })
            })
            .collect();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(games)
    }

    async fn get_templates_for_category(&self, category_id: Uuid) -> BingoResult<Vec<SquareTemplate>> {
        let mut templates: Vec<SquareTemplate> = self
            .state()
            .templates
            .values()
            .filter(|t| t.category_id == category_id)
            .cloned()
            .collect();
        templates.sort_by_key(|t| t.id);
        Ok(templates)
    }

    async fn get_sport_events(&self, ids: &[Uuid]) -> BingoResult<Vec<SportEvent>> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.sport_events.get(id).cloned())
            .collect())
    }

    async fn find_sport_event_by_api_id(&self, api_identifier: &str) -> BingoResult<Option<SportEvent>> {
        Ok(self
            .state()
            .sport_events
            .values()
            .find(|e| e.api_identifier == api_identifier)
            .cloned())
    }

    async fn insert_sport_event(&self, event: &SportEvent) -> BingoResult<SportEvent> {
        let mut state = self.state();
        if let Some(existing) = state
            .sport_events
            .values()
            .find(|e| e.api_identifier == event.api_identifier)
        {
            return Ok(existing.clone());
        }
        state.sport_events.insert(event.id, event.clone());
        Ok(event.clone())
    }

    async fn list_sport_events_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> BingoResult<Vec<SportEvent>> {
        let mut events: Vec<SportEvent> = self
            .state()
            .sport_events
            .values()
            .filter(|e| e.start_time >= from && e.start_time < to)
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.api_identifier.cmp(&b.api_identifier))
        });
        Ok(events)
    }

    async fn get_board(&self, key: BoardKey) -> BingoResult<Option<PlayerBoard>> {
        let state = self.state();
        Self::check_board_read(&state, key)?;
        Ok(state.boards.get(&key).cloned())
    }

    async fn list_boards(&self, game_id: Uuid) -> BingoResult<Vec<PlayerBoard>> {
        let state = self.state();
        let mut keys: Vec<BoardKey> = state.boards.keys().filter(|k| k.game_id == game_id).copied().collect();
        keys.sort();
        keys.iter()
            .map(|key| {
                Self::check_board_read(&state, *key)?;
                Ok(state.boards[key].clone())
            })
            .collect()
    }

    async fn delete_board(&self, key: BoardKey) -> BingoResult<bool> {
        Ok(self.state().boards.remove(&key).is_some())
    }

    async fn get_squares(&self, ids: &[Uuid]) -> BingoResult<Vec<ResolvedSquare>> {
        let state = self.state();
        Ok(ids.iter().filter_map(|id| state.squares.get(id).cloned()).collect())
    }

    async fn create_board(&self, board: &PlayerBoard, squares: &[ResolvedSquare]) -> BingoResult<()> {
        let key = BoardKey { player_id: board.player_id, game_id: board.game_id };
        let mut state = self.state();
        if state.boards.contains_key(&key) {
            return Err(BingoError::PersistenceConflict(format!(
                "player {} already has a board for game {}",
                key.player_id, key.game_id
            )));
        }
        for square in squares {
            state.squares.insert(square.id, square.clone());
        }
        state.boards.insert(key, board.clone());
        Ok(())
    }

    async fn replace_board_square(&self, replacement: &SlotReplacement) -> BingoResult<PlayerBoard> {
        let mut state = self.state();
        if let Some(remaining) = state.conflicting_replacements.get_mut(&replacement.key.player_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(BingoError::PersistenceConflict(format!(
                    "injected conflict for player {}",
                    replacement.key.player_id
                )));
            }
        }
        let board = state
            .boards
            .get_mut(&replacement.key)
            .ok_or_else(|| BingoError::NotFound(format!("board for player {}", replacement.key.player_id)))?;

        if board.rerolls_left() <= 0 {
            return Err(BingoError::NoRerollsLeft);
        }
        let slot = board
            .squares
            .iter_mut()
            .find(|s| {
                s.category_id == replacement.category_id && s.square_index == replacement.square_index
            })
            .ok_or_else(|| {
                BingoError::NotFound(format!(
                    "slot ({}, {})",
                    replacement.category_id, replacement.square_index
                ))
            })?;
        if slot.resolved_square_id != replacement.expected_square_id {
            return Err(BingoError::PersistenceConflict(format!(
                "slot ({}, {}) changed during reroll",
                replacement.category_id, replacement.square_index
            )));
        }

        slot.resolved_square_id = replacement.new_square.id;
        for slot in board.squares.iter_mut() {
            slot.rerolls_left -= 1;
        }
        let updated = board.clone();

        state
            .squares
            .insert(replacement.new_square.id, replacement.new_square.clone());
        Ok(updated)
    }

    async fn list_events_for_update(&self, started_after: DateTime<Utc>) -> BingoResult<Vec<EventSquares>> {
        let state = self.state();
        let mut due: Vec<EventSquares> = state
            .sport_events
            .values()
            .filter(|e| e.start_time >= started_after)
            .filter_map(|event| {
                let squares: Vec<ResolvedSquare> = state
                    .squares
                    .values()
                    .filter(|s| s.sport_event_id == event.id && !s.has_occurred())
                    .cloned()
                    .collect();
                (!squares.is_empty()).then(|| EventSquares { event: event.clone(), squares })
            })
            .collect();
        due.sort_by(|a, b| {
            a.event
                .start_time
                .cmp(&b.event.start_time)
                .then_with(|| a.event.api_identifier.cmp(&b.event.api_identifier))
        });
        Ok(due)
    }

    async fn commit_evaluation(
        &self,
        sport_event_id: Uuid,
        previous_cursor: GameClock,
        new_cursor: GameClock,
        changed: &[ResolvedSquare],
    ) -> BingoResult<Vec<BoardKey>> {
        let mut state = self.state();
        if state.failing_commits.contains(&sport_event_id) {
            return Err(BingoError::InvalidData(format!(
                "injected commit failure for sport event {}",
                sport_event_id
            )));
        }
        let event = state
            .sport_events
            .get_mut(&sport_event_id)
            .ok_or_else(|| BingoError::NotFound(format!("sport event {}", sport_event_id)))?;
        if event.cursor != previous_cursor {
            return Err(BingoError::PersistenceConflict(format!(
                "cursor of sport event {} moved past {}",
                sport_event_id, previous_cursor
            )));
        }
        event.cursor = new_cursor;

        for square in changed {
            if let Some(stored) = state.squares.get_mut(&square.id) {
                *stored = square.clone();
            }
        }

        let changed_ids: HashSet<Uuid> = changed.iter().map(|s| s.id).collect();
        let mut touched: Vec<BoardKey> = state
            .boards
            .iter()
            .filter(|(_, board)| {
                board
                    .squares
                    .iter()
                    .any(|slot| changed_ids.contains(&slot.resolved_square_id))
            })
            .map(|(key, _)| *key)
            .collect();
        touched.sort();
        debug!(
            "Committed {} squares for sport event {}, {} boards touched",
            changed.len(),
            sport_event_id,
            touched.len()
        );
        Ok(touched)
    }

    async fn get_patterns(&self, ids: &[Uuid]) -> BingoResult<Vec<BingoPattern>> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.patterns.iter().find(|p| p.id == *id).cloned())
            .collect())
    }

    async fn list_pattern_ids(&self) -> BingoResult<Vec<Uuid>> {
        Ok(self.state().patterns.iter().map(|p| p.id).collect())
    }

    async fn set_winning_pattern(&self, key: BoardKey, pattern_id: Uuid) -> BingoResult<bool> {
        let mut state = self.state();
        let board = state
            .boards
            .get_mut(&key)
            .ok_or_else(|| BingoError::NotFound(format!("board for player {}", key.player_id)))?;
        if board.won_pattern_id.is_some() {
            return Ok(false);
        }
        board.won_pattern_id = Some(pattern_id);
        Ok(true)
    }

    async fn seed_catalog(&self, catalog: &Catalog) -> BingoResult<()> {
        let mut state = self.state();
        for category in &catalog.categories {
            state.categories.insert(category.id, category.clone());
        }
        for template in &catalog.templates {
            state.templates.insert(template.id, template.clone());
        }
        for pattern in &catalog.patterns {
            match state.patterns.iter_mut().find(|p| p.id == pattern.id) {
                Some(existing) => *existing = pattern.clone(),
                None => state.patterns.push(pattern.clone()),
            }
        }
        Ok(())
    }
}
