use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::store::{BingoStore, BoardKey, EventSquares, SlotReplacement};
use crate::error::{BingoError, BingoResult};
use crate::game::catalog::Catalog;
use crate::models::board::{BingoGame, GameCategory, GameSummary, PlayerBoard, PlayerSquare};
use crate::models::pattern::{BingoPattern, PatternLine};
use crate::models::play::GameClock;
use crate::models::sport_event::SportEvent;
use crate::models::square::{ResolvedSquare, SquareSubject, SquareTemplate};

const SQUARE_COLUMNS: &str = "id, template_id, sport_event_id, stat, player_id, team_id, \
                              target_value, current_value, description";

const EVENT_COLUMNS: &str = "id, api_identifier, home_team, away_team, start_time, \
                             cursor_period, cursor_time";

fn sport_event_from_row(row: &PgRow) -> BingoResult<SportEvent> {
    let cursor_time: String = row.try_get("cursor_time")?;
    Ok(SportEvent {
        id: row.try_get("id")?,
        api_identifier: row.try_get("api_identifier")?,
        home_team: row.try_get("home_team")?,
        away_team: row.try_get("away_team")?,
        start_time: row.try_get("start_time")?,
        cursor: GameClock::parse(row.try_get("cursor_period")?, &cursor_time)?,
    })
}

fn square_from_row(row: &PgRow) -> BingoResult<ResolvedSquare> {
    let stat: String = row.try_get("stat")?;
    let subject = SquareSubject::from_columns(row.try_get("player_id")?, row.try_get("team_id")?)?;
    Ok(ResolvedSquare::new(
        row.try_get("id")?,
        row.try_get("template_id")?,
        row.try_get("sport_event_id")?,
        stat.parse()?,
        subject,
        row.try_get("target_value")?,
        row.try_get("current_value")?,
        row.try_get::<String, _>("description")?,
    ))
}

fn template_from_row(row: &PgRow) -> BingoResult<SquareTemplate> {
    let subject_type: String = row.try_get("subject_type")?;
    let stat: String = row.try_get("stat")?;
    SquareTemplate::new(
        row.try_get("id")?,
        row.try_get("category_id")?,
        subject_type.parse()?,
        stat.parse()?,
        row.try_get("range_min")?,
        row.try_get("range_max")?,
        row.try_get::<String, _>("display_format")?,
        row.try_get::<String, _>("description")?,
    )
}

fn player_square_from_row(row: &PgRow) -> BingoResult<PlayerSquare> {
    Ok(PlayerSquare {
        category_id: row.try_get("category_id")?,
        square_index: row.try_get::<i32, _>("square_index")? as usize,
        resolved_square_id: row.try_get("resolved_square_id")?,
        rerolls_left: row.try_get("rerolls_left")?,
    })
}

fn pattern_from_row(row: &PgRow) -> BingoResult<BingoPattern> {
    let lines: Json<Vec<PatternLine>> = row.try_get("lines")?;
    Ok(BingoPattern {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        lines: lines.0,
    })
}

/// Puts fetched rows back into the order the caller asked for
fn in_requested_order<T>(ids: &[Uuid], mut items: Vec<T>, id_of: impl Fn(&T) -> Uuid) -> Vec<T> {
    let mut ordered = Vec::with_capacity(items.len());
    for id in ids {
        if let Some(pos) = items.iter().position(|item| id_of(item) == *id) {
            ordered.push(items.swap_remove(pos));
        }
    }
    ordered
}

async fn insert_square(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    square: &ResolvedSquare,
) -> BingoResult<()> {
    sqlx::query(
        "INSERT INTO resolved_squares
            (id, template_id, sport_event_id, stat, player_id, team_id, target_value, current_value, description)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(square.id)
    .bind(square.template_id)
    .bind(square.sport_event_id)
    .bind(square.stat.as_str())
    .bind(square.subject.player_id())
    .bind(square.subject.team_id())
    .bind(square.target_value)
    .bind(square.current_value())
    .bind(&square.description)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PgBingoStore {
    pool: PgPool,
}

impl PgBingoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BingoStore for PgBingoStore {
    async fn get_game(&self, game_id: Uuid) -> BingoResult<BingoGame> {
        let row = sqlx::query("SELECT id, title, reroll_allowance FROM bingo_games WHERE id = $1")
            .bind(game_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BingoError::NotFound(format!("game {}", game_id)))?;

        let category_rows = sqlx::query(
            "SELECT category_id, category_index FROM game_categories
             WHERE game_id = $1 ORDER BY category_index",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;
        let categories = category_rows
            .iter()
            .map(|r| {
                Ok(GameCategory {
                    category_id: r.try_get("category_id")?,
                    category_index: r.try_get::<i32, _>("category_index")? as usize,
                })
            })
            .collect::<BingoResult<Vec<_>>>()?;

        let sport_event_ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT gse.sport_event_id FROM game_sport_events gse
             JOIN sport_events se ON se.id = gse.sport_event_id
             WHERE gse.game_id = $1 ORDER BY se.start_time, se.api_identifier",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        let pattern_ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT pattern_id FROM game_bingo_patterns WHERE game_id = $1 ORDER BY position",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(BingoGame {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            reroll_allowance: row.try_get("reroll_allowance")?,
            categories,
            sport_event_ids,
            pattern_ids,
        })
    }

    async fn create_game(&self, game: &BingoGame) -> BingoResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO bingo_games (id, title, reroll_allowance) VALUES ($1, $2, $3)")
            .bind(game.id)
            .bind(&game.title)
            .bind(game.reroll_allowance)
            .execute(&mut *tx)
            .await?;
        for category in &game.categories {
            sqlx::query(
                "INSERT INTO game_categories (game_id, category_id, category_index) VALUES ($1, $2, $3)",
            )
            .bind(game.id)
            .bind(category.category_id)
            .bind(category.category_index as i32)
            .execute(&mut *tx)
            .await?;
        }
        for sport_event_id in &game.sport_event_ids {
            sqlx::query("INSERT INTO game_sport_events (game_id, sport_event_id) VALUES ($1, $2)")
                .bind(game.id)
                .bind(sport_event_id)
                .execute(&mut *tx)
                .await?;
        }
        for (position, pattern_id) in game.pattern_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO game_bingo_patterns (game_id, pattern_id, position) VALUES ($1, $2, $3)",
            )
            .bind(game.id)
            .bind(pattern_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        info!("Created bingo game {} ({})", game.id, game.title);
        Ok(())
    }

    async fn list_games_since(&self, since: DateTime<Utc>) -> BingoResult<Vec<GameSummary>> {
        let rows = sqlx::query(
            "SELECT g.id, g.title, g.created_at, COUNT(pb.player_id) AS player_count
             FROM bingo_games g
             LEFT JOIN player_boards pb ON pb.game_id = g.id
             WHERE g.created_at >= $1
             GROUP BY g.id, g.title, g.created_at
             ORDER BY g.created_at DESC, g.id",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|r| {
                Ok(GameSummary {
                    id: r.try_get("id")?,
                    title: r.try_get("title")?,
                    created_at: r.try_get("created_at")?,
                    player_count: r.try_get::<i64, _>("player_count")? as usize,
                })
            })
            .collect()
    }

    async fn get_templates_for_category(&self, category_id: Uuid) -> BingoResult<Vec<SquareTemplate>> {
        let rows = sqlx::query(
            "SELECT id, category_id, subject_type, stat, range_min, range_max, display_format, description
             FROM square_templates WHERE category_id = $1 ORDER BY id",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(template_from_row).collect()
    }

    async fn get_sport_events(&self, ids: &[Uuid]) -> BingoResult<Vec<SportEvent>> {
        let rows = sqlx::query(&format!("SELECT {} FROM sport_events WHERE id = ANY($1)", EVENT_COLUMNS))
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        let events = rows.iter().map(sport_event_from_row).collect::<BingoResult<Vec<_>>>()?;
        Ok(in_requested_order(ids, events, |e| e.id))
    }

    async fn find_sport_event_by_api_id(&self, api_identifier: &str) -> BingoResult<Option<SportEvent>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sport_events WHERE api_identifier = $1",
            EVENT_COLUMNS
        ))
        .bind(api_identifier)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(sport_event_from_row).transpose()
    }

    async fn insert_sport_event(&self, event: &SportEvent) -> BingoResult<SportEvent> {
        let inserted = sqlx::query(&format!(
            "INSERT INTO sport_events
                (id, api_identifier, home_team, away_team, start_time, cursor_period, cursor_time)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (api_identifier) DO NOTHING
             RETURNING {}",
            EVENT_COLUMNS
        ))
        .bind(event.id)
        .bind(&event.api_identifier)
        .bind(&event.home_team)
        .bind(&event.away_team)
        .bind(event.start_time)
        .bind(event.cursor.period)
        .bind(event.cursor.time_in_period.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(row) => sport_event_from_row(&row),
            None => self
                .find_sport_event_by_api_id(&event.api_identifier)
                .await?
                .ok_or_else(|| BingoError::PersistenceConflict(format!(
                    "sport event {} vanished during insert",
                    event.api_identifier
                ))),
        }
    }

    async fn list_sport_events_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> BingoResult<Vec<SportEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sport_events
             WHERE start_time >= $1 AND start_time < $2
             ORDER BY start_time, api_identifier",
            EVENT_COLUMNS
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(sport_event_from_row).collect()
    }

    async fn get_board(&self, key: BoardKey) -> BingoResult<Option<PlayerBoard>> {
        let Some(board_row) = sqlx::query(
            "SELECT won_pattern_id FROM player_boards WHERE player_id = $1 AND game_id = $2",
        )
        .bind(key.player_id)
        .bind(key.game_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let rows = sqlx::query(
            "SELECT category_id, square_index, resolved_square_id, rerolls_left
             FROM player_squares WHERE player_id = $1 AND game_id = $2
             ORDER BY category_id, square_index",
        )
        .bind(key.player_id)
        .bind(key.game_id)
        .fetch_all(&self.pool)
        .await?;
        let squares = rows.iter().map(player_square_from_row).collect::<BingoResult<Vec<_>>>()?;

        Ok(Some(PlayerBoard {
            player_id: key.player_id,
            game_id: key.game_id,
            won_pattern_id: board_row.try_get("won_pattern_id")?,
            squares,
        }))
    }

    async fn list_boards(&self, game_id: Uuid) -> BingoResult<Vec<PlayerBoard>> {
        let board_rows = sqlx::query(
            "SELECT player_id, won_pattern_id FROM player_boards WHERE game_id = $1 ORDER BY player_id",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;
        let slot_rows = sqlx::query(
            "SELECT player_id, category_id, square_index, resolved_square_id, rerolls_left
             FROM player_squares WHERE game_id = $1
             ORDER BY player_id, category_id, square_index",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        let mut slots: HashMap<Uuid, Vec<PlayerSquare>> = HashMap::new();
        for row in &slot_rows {
            let player_id: Uuid = row.try_get("player_id")?;
            slots.entry(player_id).or_default().push(player_square_from_row(row)?);
        }
        board_rows
            .iter()
            .map(|r| {
                let player_id: Uuid = r.try_get("player_id")?;
                Ok(PlayerBoard {
                    player_id,
                    game_id,
                    won_pattern_id: r.try_get("won_pattern_id")?,
                    squares: slots.remove(&player_id).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Slots go with the board through the cascading foreign key
    async fn delete_board(&self, key: BoardKey) -> BingoResult<bool> {
        let result = sqlx::query("DELETE FROM player_boards WHERE player_id = $1 AND game_id = $2")
            .bind(key.player_id)
            .bind(key.game_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn get_squares(&self, ids: &[Uuid]) -> BingoResult<Vec<ResolvedSquare>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM resolved_squares WHERE id = ANY($1)",
            SQUARE_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(square_from_row).collect()
    }

    async fn create_board(&self, board: &PlayerBoard, squares: &[ResolvedSquare]) -> BingoResult<()> {
        let mut tx = self.pool.begin().await?;
        let created = sqlx::query(
            "INSERT INTO player_boards (player_id, game_id) VALUES ($1, $2)
             ON CONFLICT (player_id, game_id) DO NOTHING",
        )
        .bind(board.player_id)
        .bind(board.game_id)
        .execute(&mut *tx)
        .await?;
        if created.rows_affected() == 0 {
            return Err(BingoError::PersistenceConflict(format!(
                "player {} already has a board for game {}",
                board.player_id, board.game_id
            )));
        }

        for square in squares {
            insert_square(&mut tx, square).await?;
        }
        for slot in &board.squares {
            sqlx::query(
                "INSERT INTO player_squares
                    (player_id, game_id, category_id, square_index, resolved_square_id, rerolls_left)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(board.player_id)
            .bind(board.game_id)
            .bind(slot.category_id)
            .bind(slot.square_index as i32)
            .bind(slot.resolved_square_id)
            .bind(slot.rerolls_left)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        debug!("Stored board for player {} in game {}", board.player_id, board.game_id);
        Ok(())
    }

    async fn replace_board_square(&self, replacement: &SlotReplacement) -> BingoResult<PlayerBoard> {
        let key = replacement.key;
        let mut tx = self.pool.begin().await?;

        let rerolls_left: Option<i32> = sqlx::query_scalar(
            "SELECT MIN(rerolls_left) FROM player_squares WHERE player_id = $1 AND game_id = $2",
        )
        .bind(key.player_id)
        .bind(key.game_id)
        .fetch_one(&mut *tx)
        .await?;
        match rerolls_left {
            None => return Err(BingoError::NotFound(format!("board for player {}", key.player_id))),
            Some(left) if left <= 0 => return Err(BingoError::NoRerollsLeft),
            Some(_) => {}
        }

        insert_square(&mut tx, &replacement.new_square).await?;
        let swapped = sqlx::query(
            "UPDATE player_squares SET resolved_square_id = $5
             WHERE player_id = $1 AND game_id = $2 AND category_id = $3 AND square_index = $4
               AND resolved_square_id = $6 AND rerolls_left > 0",
        )
        .bind(key.player_id)
        .bind(key.game_id)
        .bind(replacement.category_id)
        .bind(replacement.square_index as i32)
        .bind(replacement.new_square.id)
        .bind(replacement.expected_square_id)
        .execute(&mut *tx)
        .await?;
        if swapped.rows_affected() == 0 {
            return Err(BingoError::PersistenceConflict(format!(
                "slot ({}, {}) changed during reroll",
                replacement.category_id, replacement.square_index
            )));
        }

        sqlx::query(
            "UPDATE player_squares SET rerolls_left = rerolls_left - 1
             WHERE player_id = $1 AND game_id = $2",
        )
        .bind(key.player_id)
        .bind(key.game_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.get_board(key)
            .await?
            .ok_or_else(|| BingoError::NotFound(format!("board for player {}", key.player_id)))
    }

    async fn list_events_for_update(&self, started_after: DateTime<Utc>) -> BingoResult<Vec<EventSquares>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sport_events se
             WHERE se.start_time >= $1
               AND EXISTS (
                   SELECT 1 FROM resolved_squares rs
                   WHERE rs.sport_event_id = se.id AND NOT rs.has_occurred
               )
             ORDER BY se.start_time",
            EVENT_COLUMNS
        ))
        .bind(started_after)
        .fetch_all(&self.pool)
        .await?;
        let events = rows.iter().map(sport_event_from_row).collect::<BingoResult<Vec<_>>>()?;
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let event_ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
        let square_rows = sqlx::query(&format!(
            "SELECT {} FROM resolved_squares
             WHERE sport_event_id = ANY($1) AND NOT has_occurred",
            SQUARE_COLUMNS
        ))
        .bind(&event_ids)
        .fetch_all(&self.pool)
        .await?;
        let mut squares = square_rows.iter().map(square_from_row).collect::<BingoResult<Vec<_>>>()?;

        Ok(events
            .into_iter()
            .map(|event| {
                let (mine, rest): (Vec<_>, Vec<_>) =
                    squares.drain(..).partition(|s| s.sport_event_id == event.id);
                squares = rest;
                EventSquares { event, squares: mine }
            })
            .collect())
    }

    async fn commit_evaluation(
        &self,
        sport_event_id: Uuid,
        previous_cursor: GameClock,
        new_cursor: GameClock,
        changed: &[ResolvedSquare],
    ) -> BingoResult<Vec<BoardKey>> {
        let mut tx = self.pool.begin().await?;

        let advanced = sqlx::query(
            "UPDATE sport_events SET cursor_period = $2, cursor_time = $3
             WHERE id = $1 AND cursor_period = $4 AND cursor_time = $5",
        )
        .bind(sport_event_id)
        .bind(new_cursor.period)
        .bind(new_cursor.time_in_period.to_string())
        .bind(previous_cursor.period)
        .bind(previous_cursor.time_in_period.to_string())
        .execute(&mut *tx)
        .await?;
        if advanced.rows_affected() == 0 {
            return Err(BingoError::PersistenceConflict(format!(
                "cursor of sport event {} moved past {}",
                sport_event_id, previous_cursor
            )));
        }

        for square in changed {
            sqlx::query("UPDATE resolved_squares SET current_value = $2 WHERE id = $1")
                .bind(square.id)
                .bind(square.current_value())
                .execute(&mut *tx)
                .await?;
        }

        let changed_ids: Vec<Uuid> = changed.iter().map(|s| s.id).collect();
        let rows = sqlx::query(
            "SELECT DISTINCT player_id, game_id FROM player_squares
             WHERE resolved_square_id = ANY($1)",
        )
        .bind(&changed_ids)
        .fetch_all(&mut *tx)
        .await?;
        let touched = rows
            .iter()
            .map(|r| {
                Ok(BoardKey {
                    player_id: r.try_get("player_id")?,
                    game_id: r.try_get("game_id")?,
                })
            })
            .collect::<BingoResult<Vec<_>>>()?;

        tx.commit().await?;
        Ok(touched)
    }

    async fn get_patterns(&self, ids: &[Uuid]) -> BingoResult<Vec<BingoPattern>> {
        let rows = sqlx::query(
            "SELECT id, name, description, lines FROM bingo_patterns WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        let patterns = rows.iter().map(pattern_from_row).collect::<BingoResult<Vec<_>>>()?;
        Ok(in_requested_order(ids, patterns, |p| p.id))
    }

    async fn list_pattern_ids(&self) -> BingoResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar("SELECT id FROM bingo_patterns ORDER BY position, name")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn set_winning_pattern(&self, key: BoardKey, pattern_id: Uuid) -> BingoResult<bool> {
        let result = sqlx::query(
            "UPDATE player_boards SET won_pattern_id = $3
             WHERE player_id = $1 AND game_id = $2 AND won_pattern_id IS NULL",
        )
        .bind(key.player_id)
        .bind(key.game_id)
        .bind(pattern_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn seed_catalog(&self, catalog: &Catalog) -> BingoResult<()> {
        let mut tx = self.pool.begin().await?;
        for category in &catalog.categories {
            sqlx::query(
                "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3)
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, description = EXCLUDED.description",
            )
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.description)
            .execute(&mut *tx)
            .await?;
        }
        for template in &catalog.templates {
            sqlx::query(
                "INSERT INTO square_templates
                    (id, category_id, subject_type, stat, range_min, range_max, display_format, description)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 ON CONFLICT (id) DO UPDATE SET
                    display_format = EXCLUDED.display_format,
                    description = EXCLUDED.description",
            )
            .bind(template.id)
            .bind(template.category_id)
            .bind(template.subject_type.as_str())
            .bind(template.stat.as_str())
            .bind(template.range_min)
            .bind(template.range_max)
            .bind(&template.display_format)
            .bind(&template.description)
            .execute(&mut *tx)
            .await?;
        }
        for (position, pattern) in catalog.patterns.iter().enumerate() {
            sqlx::query(
                "INSERT INTO bingo_patterns (id, name, description, lines, position)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name,
                    description = EXCLUDED.description,
                    lines = EXCLUDED.lines,
                    position = EXCLUDED.position",
            )
            .bind(pattern.id)
            .bind(&pattern.name)
            .bind(&pattern.description)
            .bind(Json(&pattern.lines))
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        info!(
            "Seeded catalog: {} categories, {} templates, {} patterns",
            catalog.categories.len(),
            catalog.templates.len(),
            catalog.patterns.len()
        );
        Ok(())
    }
}
