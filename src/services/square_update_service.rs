use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::store::{BingoStore, BoardKey, EventSquares};
use crate::error::{BingoError, BingoResult};
use crate::game::bingo::{first_winning_pattern, BoardGrid};
use crate::game::interpreter::evaluate;
use crate::models::sport_event::PlayByPlay;
use crate::services::nhl_client::SportsDataSource;

/// Outcome of one update cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateCycleSummary {
    pub updated_square_count: usize,
    pub updated_player_count: usize,
    pub events_processed: usize,
    pub events_skipped: usize,
    pub new_bingos: usize,
}

pub struct SquareUpdateService {
    store: Arc<dyn BingoStore>,
    data_source: Arc<dyn SportsDataSource>,
    game_ttl: chrono::Duration,
    fetch_timeout: Duration,
}

impl SquareUpdateService {
    pub fn new(
        store: Arc<dyn BingoStore>,
        data_source: Arc<dyn SportsDataSource>,
        game_ttl: chrono::Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            store,
            data_source,
            game_ttl,
            fetch_timeout,
        }
    }

    /// Folds new plays of every live sport event into its squares, then
    /// checks the boards holding changed squares for new bingos.
    /// Failures of one event or one board are logged and counted, never fatal.
    #[tracing::instrument(name = "Square update cycle", skip(self))]
    pub async fn run_update_cycle(&self) -> BingoResult<UpdateCycleSummary> {
        let started_after = Utc::now() - self.game_ttl;
        let due = self.store.list_events_for_update(started_after).await?;
        let mut summary = UpdateCycleSummary::default();
        if due.is_empty() {
            info!("No sport events need updating");
            return Ok(summary);
        }

        let snapshots = self.fetch_play_by_play(&due).await;

        let mut touched: BTreeSet<BoardKey> = BTreeSet::new();
        for entry in &due {
            let api_identifier = &entry.event.api_identifier;
            let pbp = match snapshots.get(api_identifier) {
                Some(Ok(pbp)) => pbp,
                Some(Err(e)) => {
                    warn!("⚠️ Skipping sport event {}: {}", api_identifier, e);
                    summary.events_skipped += 1;
                    continue;
                }
                None => {
                    summary.events_skipped += 1;
                    continue;
                }
            };

            match self.apply_plays(entry, pbp).await {
                Ok((square_count, boards)) => {
                    summary.events_processed += 1;
                    summary.updated_square_count += square_count;
                    touched.extend(boards);
                }
                Err(e) => {
                    error!("❌ Failed to update squares of sport event {}: {}", api_identifier, e);
                    summary.events_skipped += 1;
                }
            }
        }
        summary.updated_player_count = touched.len();

        let checks = join_all(touched.iter().map(|key| self.check_board(*key))).await;
        for result in checks {
            match result {
                Ok(Some(_)) => summary.new_bingos += 1,
                Ok(None) => {}
                Err(e) => error!("❌ {}", e),
            }
        }

        info!(
            "✅ Update cycle: {} events processed, {} skipped, {} squares updated across {} boards, {} new bingos",
            summary.events_processed,
            summary.events_skipped,
            summary.updated_square_count,
            summary.updated_player_count,
            summary.new_bingos
        );
        Ok(summary)
    }

    /// One fetch per external game, all in flight at once, each under the fetch timeout
    async fn fetch_play_by_play(&self, due: &[EventSquares]) -> HashMap<String, BingoResult<PlayByPlay>> {
        let identifiers: BTreeSet<&str> = due.iter().map(|e| e.event.api_identifier.as_str()).collect();
        let fetches = identifiers.into_iter().map(|api_identifier| async move {
            let result = match tokio::time::timeout(
                self.fetch_timeout,
                self.data_source.get_play_by_play(api_identifier),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(BingoError::upstream(
                    api_identifier,
                    format!("timed out after {:?}", self.fetch_timeout),
                )),
            };
            (api_identifier.to_string(), result)
        });
        join_all(fetches).await.into_iter().collect()
    }

    /// Returns the number of changed squares and the boards holding them
    async fn apply_plays(&self, entry: &EventSquares, pbp: &PlayByPlay) -> BingoResult<(usize, Vec<BoardKey>)> {
        let event = &entry.event;
        let evaluation = evaluate(&entry.squares, pbp, event.cursor);
        if evaluation.plays_processed == 0 {
            return Ok((0, Vec::new()));
        }

        let boards = self
            .store
            .commit_evaluation(event.id, event.cursor, evaluation.cursor, &evaluation.changed)
            .await?;
        tracing::debug!(
            "Sport event {}: {} new plays, cursor {} -> {}, {} squares changed",
            event.api_identifier,
            evaluation.plays_processed,
            event.cursor,
            evaluation.cursor,
            evaluation.changed.len()
        );
        Ok((evaluation.changed.len(), boards))
    }

    /// Records the first winning pattern of a board that has not won yet
    async fn check_board(&self, key: BoardKey) -> BingoResult<Option<Uuid>> {
        self.find_new_bingo(key)
            .await
            .map_err(|e| BingoError::PatternEvaluationFailed {
                player_id: key.player_id,
                game_id: key.game_id,
                message: e.to_string(),
            })
    }

    async fn find_new_bingo(&self, key: BoardKey) -> BingoResult<Option<Uuid>> {
        let Some(board) = self.store.get_board(key).await? else {
            return Ok(None);
        };
        if board.won_pattern_id.is_some() {
            return Ok(None);
        }

        let game = self.store.get_game(key.game_id).await?;
        let ids: Vec<Uuid> = board.squares.iter().map(|s| s.resolved_square_id).collect();
        let squares = self.store.get_squares(&ids).await?;
        let grid = BoardGrid::from_board(&game, &board, &squares)?;
        let patterns = self.store.get_patterns(&game.pattern_ids).await?;

        let Some(pattern) = first_winning_pattern(&grid, &patterns) else {
            return Ok(None);
        };
        if !self.store.set_winning_pattern(key, pattern.id).await? {
            return Ok(None);
        }
        info!("🎉 Player {} got a '{}' bingo in game {}", key.player_id, pattern.name, key.game_id);
        Ok(Some(pattern.id))
    }
}
