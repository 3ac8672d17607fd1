use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::BingoResult;
use crate::game::catalog::Catalog;
use crate::models::board::{BingoGame, GameSummary, PlayerBoard};
use crate::models::pattern::BingoPattern;
use crate::models::play::GameClock;
use crate::models::sport_event::SportEvent;
use crate::models::square::{ResolvedSquare, SquareTemplate};

/// Identifies one player's board in one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardKey {
    pub player_id: Uuid,
    pub game_id: Uuid,
}

/// A sport event due for evaluation with its unresolved squares
#[derive(Debug, Clone)]
pub struct EventSquares {
    pub event: SportEvent,
    pub squares: Vec<ResolvedSquare>,
}

/// Swap of one board slot during a reroll
#[derive(Debug, Clone)]
pub struct SlotReplacement {
    pub key: BoardKey,
    pub category_id: Uuid,
    pub square_index: usize,
    /// Square the caller read; the swap fails if the slot moved on since
    pub expected_square_id: Uuid,
    pub new_square: ResolvedSquare,
}

#[async_trait]
pub trait BingoStore: Send + Sync {
    async fn get_game(&self, game_id: Uuid) -> BingoResult<BingoGame>;

    async fn create_game(&self, game: &BingoGame) -> BingoResult<()>;

    /// Games created at or after `since`, newest first
    async fn list_games_since(&self, since: DateTime<Utc>) -> BingoResult<Vec<GameSummary>>;

    async fn get_templates_for_category(&self, category_id: Uuid) -> BingoResult<Vec<SquareTemplate>>;

    async fn get_sport_events(&self, ids: &[Uuid]) -> BingoResult<Vec<SportEvent>>;

    async fn find_sport_event_by_api_id(&self, api_identifier: &str) -> BingoResult<Option<SportEvent>>;

    /// Returns the stored event, which is the existing one if the identifier is taken
    async fn insert_sport_event(&self, event: &SportEvent) -> BingoResult<SportEvent>;

    /// Events starting in `[from, to)`, earliest first
    async fn list_sport_events_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> BingoResult<Vec<SportEvent>>;

    async fn get_board(&self, key: BoardKey) -> BingoResult<Option<PlayerBoard>>;

    async fn list_boards(&self, game_id: Uuid) -> BingoResult<Vec<PlayerBoard>>;

    /// Removes a board and its slots, keeping its squares. Returns whether a board existed.
    async fn delete_board(&self, key: BoardKey) -> BingoResult<bool>;

    async fn get_squares(&self, ids: &[Uuid]) -> BingoResult<Vec<ResolvedSquare>>;

    /// Stores a new board with its squares; `PersistenceConflict` if one exists
    async fn create_board(&self, board: &PlayerBoard, squares: &[ResolvedSquare]) -> BingoResult<()>;

    /// Swaps one slot's square and spends one reroll from the whole board.
    /// `NoRerollsLeft` when the budget is spent, `PersistenceConflict` when
    /// the slot no longer holds the expected square. The replaced square stays stored.
    async fn replace_board_square(&self, replacement: &SlotReplacement) -> BingoResult<PlayerBoard>;

    /// Events started at or after `started_after` that still have unresolved squares
    async fn list_events_for_update(&self, started_after: DateTime<Utc>) -> BingoResult<Vec<EventSquares>>;

    /// Persists new counters and the advanced cursor as one unit. Fails with
    /// `PersistenceConflict` when the stored cursor is no longer `previous_cursor`.
    /// Returns the boards holding any of the changed squares.
    async fn commit_evaluation(
        &self,
        sport_event_id: Uuid,
        previous_cursor: GameClock,
        new_cursor: GameClock,
        changed: &[ResolvedSquare],
    ) -> BingoResult<Vec<BoardKey>>;

    /// Patterns in the order of `ids`
    async fn get_patterns(&self, ids: &[Uuid]) -> BingoResult<Vec<BingoPattern>>;

    async fn list_pattern_ids(&self) -> BingoResult<Vec<Uuid>>;

    /// Records a win unless the board already has one; returns whether it was recorded
    async fn set_winning_pattern(&self, key: BoardKey, pattern_id: Uuid) -> BingoResult<bool>;

    /// Upserts built-in categories, templates and patterns
    async fn seed_catalog(&self, catalog: &Catalog) -> BingoResult<()>;
}
