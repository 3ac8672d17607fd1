use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::try_join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::store::{BingoStore, BoardKey, SlotReplacement};
use crate::error::{BingoError, BingoResult};
use crate::game::generator::{CategoryTemplates, EventContext, GeneratorSettings, Occupant, SquareGenerator};
use crate::game::rand::{BingoRng, SeedKey};
use crate::models::board::{BingoGame, BoardCell, BoardView, PlayerBoard, PlayerSquare, BOARD_SIZE};
use crate::models::square::ResolvedSquare;
use crate::services::nhl_client::SportsDataSource;

/// One async lock per board so generation and rerolls of the same board never interleave
#[derive(Default)]
struct BoardLocks {
    locks: Mutex<HashMap<BoardKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl BoardLocks {
    fn for_board(&self, key: BoardKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Drop entries nobody is waiting on
        locks.retain(|k, lock| *k == key || Arc::strong_count(lock) > 1);
        locks.entry(key).or_default().clone()
    }
}

pub struct BoardService {
    store: Arc<dyn BingoStore>,
    data_source: Arc<dyn SportsDataSource>,
    settings: GeneratorSettings,
    locks: BoardLocks,
}

impl BoardService {
    pub fn new(
        store: Arc<dyn BingoStore>,
        data_source: Arc<dyn SportsDataSource>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            store,
            data_source,
            settings,
            locks: BoardLocks::default(),
        }
    }

    /// Creates the player's board for a game, or returns the stored one unchanged
    #[tracing::instrument(name = "Generate board", skip(self))]
    pub async fn generate_board(&self, player_id: Uuid, game_id: Uuid) -> BingoResult<PlayerBoard> {
        let key = BoardKey { player_id, game_id };
        let lock = self.locks.for_board(key);
        let _guard = lock.lock().await;

        if let Some(existing) = self.store.get_board(key).await? {
            debug!("Player {} already has a board for game {}", player_id, game_id);
            return Ok(existing);
        }

        let game = self.store.get_game(game_id).await?;
        game.validate()?;
        let events = self.event_contexts(&game).await?;
        let columns = self.category_templates(&game).await?;

        let rng = BingoRng::from_key(&SeedKey::Board { player_id, game_id });
        let drafts = SquareGenerator::new(rng, &events, self.settings).generate_board(&columns)?;

        let mut squares = Vec::with_capacity(drafts.len());
        let mut slots = Vec::with_capacity(drafts.len());
        for slot in drafts {
            let square = slot.draft.into_square(Uuid::new_v4());
            slots.push(PlayerSquare {
                category_id: slot.category_id,
                square_index: slot.square_index,
                resolved_square_id: square.id,
                rerolls_left: game.reroll_allowance,
            });
            squares.push(square);
        }
        let board = PlayerBoard {
            player_id,
            game_id,
            won_pattern_id: None,
            squares: slots,
        };

        match self.store.create_board(&board, &squares).await {
            Ok(()) => {
                info!("✅ Generated board with {} squares for player {} in game {}", squares.len(), player_id, game_id);
                Ok(board)
            }
            // Another instance won the race; its board is the board
            Err(BingoError::PersistenceConflict(reason)) => {
                warn!("Board creation raced for player {}: {}", player_id, reason);
                self.store
                    .get_board(key)
                    .await?
                    .ok_or_else(|| BingoError::PersistenceConflict(reason))
            }
            Err(e) => Err(e),
        }
    }

    /// Replaces one slot with a freshly drawn square and spends one reroll.
    /// Returns the square now in the slot.
    #[tracing::instrument(name = "Reroll square", skip(self))]
    pub async fn reroll_square(
        &self,
        player_id: Uuid,
        game_id: Uuid,
        category_id: Uuid,
        square_index: usize,
    ) -> BingoResult<ResolvedSquare> {
        if square_index >= BOARD_SIZE {
            return Err(BingoError::InvalidData(format!(
                "square index {} is off the board",
                square_index
            )));
        }
        let key = BoardKey { player_id, game_id };
        let lock = self.locks.for_board(key);
        let _guard = lock.lock().await;

        match self.try_reroll(key, category_id, square_index).await {
            Err(e) if e.is_transient() => {
                warn!("Retrying reroll for player {} after: {}", player_id, e);
                self.try_reroll(key, category_id, square_index).await
            }
            result => result,
        }
    }

    async fn try_reroll(&self, key: BoardKey, category_id: Uuid, square_index: usize) -> BingoResult<ResolvedSquare> {
        let board = self
            .store
            .get_board(key)
            .await?
            .ok_or_else(|| BingoError::NotFound(format!("board for player {} in game {}", key.player_id, key.game_id)))?;
        let rerolls_left = board.rerolls_left();
        if rerolls_left <= 0 {
            return Err(BingoError::NoRerollsLeft);
        }
        if board.won_pattern_id.is_some() {
            return Err(BingoError::InvalidData("a winning board cannot be rerolled".to_string()));
        }
        let slot = board.slot(category_id, square_index).ok_or_else(|| {
            BingoError::NotFound(format!("slot ({}, {})", category_id, square_index))
        })?;

        let game = self.store.get_game(key.game_id).await?;
        let events = self.event_contexts(&game).await?;
        let templates = self.store.get_templates_for_category(category_id).await?;

        let others: Vec<Uuid> = board
            .squares
            .iter()
            .filter(|s| s.resolved_square_id != slot.resolved_square_id)
            .map(|s| s.resolved_square_id)
            .collect();
        let taken: Vec<Occupant> = self
            .store
            .get_squares(&others)
            .await?
            .iter()
            .map(Occupant::from)
            .collect();

        let rng = BingoRng::from_key(&SeedKey::Reroll {
            player_id: key.player_id,
            game_id: key.game_id,
            category_id,
            square_index,
            rerolls_left,
        });
        let draft = SquareGenerator::new(rng, &events, self.settings).draw_square(category_id, &templates, &taken)?;
        let new_square = draft.into_square(Uuid::new_v4());

        let updated = self
            .store
            .replace_board_square(&SlotReplacement {
                key,
                category_id,
                square_index,
                expected_square_id: slot.resolved_square_id,
                new_square: new_square.clone(),
            })
            .await?;
        info!(
            "🎲 Rerolled slot ({}, {}) for player {}, {} rerolls left",
            category_id,
            square_index,
            key.player_id,
            updated.rerolls_left()
        );
        Ok(new_square)
    }

    /// Removes the player's board from the game. Its squares stay stored.
    #[tracing::instrument(name = "Leave game", skip(self))]
    pub async fn leave_game(&self, player_id: Uuid, game_id: Uuid) -> BingoResult<()> {
        let key = BoardKey { player_id, game_id };
        let lock = self.locks.for_board(key);
        let _guard = lock.lock().await;

        if !self.store.delete_board(key).await? {
            return Err(BingoError::NotFound(format!(
                "board for player {} in game {}",
                player_id, game_id
            )));
        }
        info!("Player {} left game {}", player_id, game_id);
        Ok(())
    }

    /// The board laid out on the grid with each square's current state
    pub async fn get_board_view(&self, player_id: Uuid, game_id: Uuid) -> BingoResult<BoardView> {
        let key = BoardKey { player_id, game_id };
        let board = self
            .store
            .get_board(key)
            .await?
            .ok_or_else(|| BingoError::NotFound(format!("board for player {} in game {}", player_id, game_id)))?;
        let game = self.store.get_game(game_id).await?;

        let ids: Vec<Uuid> = board.squares.iter().map(|s| s.resolved_square_id).collect();
        let squares = self.store.get_squares(&ids).await?;

        let mut cells = Vec::with_capacity(board.squares.len());
        for slot in &board.squares {
            let x = game.category_index(slot.category_id).ok_or_else(|| {
                BingoError::InvalidData(format!("category {} is not part of game {}", slot.category_id, game_id))
            })?;
            let square = squares
                .iter()
                .find(|s| s.id == slot.resolved_square_id)
                .ok_or_else(|| BingoError::NotFound(format!("square {}", slot.resolved_square_id)))?;
            cells.push(BoardCell {
                x,
                y: slot.square_index,
                category_id: slot.category_id,
                square: square.snapshot(),
            });
        }
        cells.sort_by_key(|c| (c.x, c.y));

        Ok(BoardView {
            player_id,
            game_id,
            rerolls_left: board.rerolls_left(),
            won_pattern_id: board.won_pattern_id,
            cells,
        })
    }

    /// Sport events of the game with roster snapshots, in start order
    async fn event_contexts(&self, game: &BingoGame) -> BingoResult<Vec<EventContext>> {
        let mut events = self.store.get_sport_events(&game.sport_event_ids).await?;
        if events.len() != game.sport_event_ids.len() {
            return Err(BingoError::NotFound(format!(
                "{} of {} sport events of game {}",
                game.sport_event_ids.len() - events.len(),
                game.sport_event_ids.len(),
                game.id
            )));
        }
        events.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.api_identifier.cmp(&b.api_identifier))
        });

        let rosters = try_join_all(
            events
                .iter()
                .map(|event| self.data_source.get_roster(&event.api_identifier)),
        )
        .await?;

        Ok(events
            .into_iter()
            .zip(rosters)
            .map(|(event, roster)| EventContext {
                sport_event_id: event.id,
                roster,
            })
            .collect())
    }

    async fn category_templates(&self, game: &BingoGame) -> BingoResult<Vec<CategoryTemplates>> {
        let mut columns = Vec::with_capacity(game.categories.len());
        for category in &game.categories {
            let templates = self.store.get_templates_for_category(category.category_id).await?;
            columns.push(CategoryTemplates {
                category: *category,
                templates,
            });
        }
        Ok(columns)
    }
}
