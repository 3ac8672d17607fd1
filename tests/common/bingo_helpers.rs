use chrono::{Duration, Utc};
use uuid::Uuid;

use hockey_bingo_backend::game::catalog::{default_catalog, display_format, Catalog};
use hockey_bingo_backend::models::board::{BingoGame, BoardView, Category, BOARD_SIZE};
use hockey_bingo_backend::models::common::RinkSide;
use hockey_bingo_backend::models::play::{GameClock, HitDetails, Play, PlayKind};
use hockey_bingo_backend::models::sport_event::{GameRoster, RosterPlayer, SeasonStats, SportEvent, TeamInfo};
use hockey_bingo_backend::models::square::{SquareTemplate, StatKind, SubjectType};
use hockey_bingo_backend::services::NewGame;

use super::utils::TestApp;

pub const HOME_TEAM_ID: i64 = 10;
pub const AWAY_TEAM_ID: i64 = 6;

const FORWARD_POSITIONS: [&str; 4] = ["C", "L", "R", "F"];

fn team_players(team_id: i64, abbrev: &str, base_id: i64) -> Vec<RosterPlayer> {
    let forwards = (0..12).map(|i| RosterPlayer {
        player_id: base_id + i,
        team_id,
        name: format!("{} Forward {}", abbrev, i + 1),
        position: FORWARD_POSITIONS[i as usize % FORWARD_POSITIONS.len()].to_string(),
        season: SeasonStats { goals: 12 - i as i32, ..SeasonStats::default() },
    });
    let defense = (0..6).map(|i| RosterPlayer {
        player_id: base_id + 50 + i,
        team_id,
        name: format!("{} Defense {}", abbrev, i + 1),
        position: "D".to_string(),
        season: SeasonStats::default(),
    });
    let goalies = (0..2).map(|i| RosterPlayer {
        player_id: base_id + 90 + i,
        team_id,
        name: format!("{} Goalie {}", abbrev, i + 1),
        position: "G".to_string(),
        season: SeasonStats::default(),
    });
    forwards.chain(defense).chain(goalies).collect()
}

/// BOS at TOR, started an hour ago
pub fn roster() -> GameRoster {
    let mut players = team_players(HOME_TEAM_ID, "TOR", 8_470_000);
    players.extend(team_players(AWAY_TEAM_ID, "BOS", 8_480_000));
    GameRoster {
        home_team: TeamInfo { id: HOME_TEAM_ID, name: "Maple Leafs".into(), abbrev: "TOR".into() },
        away_team: TeamInfo { id: AWAY_TEAM_ID, name: "Bruins".into(), abbrev: "BOS".into() },
        start_time: Some(Utc::now() - Duration::hours(1)),
        players,
    }
}

pub fn hit(event_id: i64, period: i32, time_remaining: &str, owner: i64, hitter: Option<i64>) -> Play {
    Play {
        event_id,
        clock: GameClock::parse(period, time_remaining).unwrap(),
        situation_code: "1551".to_string(),
        home_team_defending_side: Some(RinkSide::Left),
        kind: PlayKind::Hit(HitDetails {
            event_owner_team_id: owner,
            hitting_player_id: hitter,
            hittee_player_id: None,
            zone_code: None,
        }),
    }
}

/// Five categories whose every square is a single hit by one skater, so
/// boards are easy to drive to a bingo
pub fn hit_catalog() -> Catalog {
    let defaults = default_catalog().unwrap();
    let mut categories = Vec::new();
    let mut templates = Vec::new();
    for i in 0..BOARD_SIZE {
        let category = Category {
            id: Uuid::new_v4(),
            name: format!("Hitters {}", i + 1),
            description: None,
        };
        for subject in [SubjectType::Forward, SubjectType::Defense] {
            templates.push(
                SquareTemplate::new(
                    Uuid::new_v4(),
                    category.id,
                    subject,
                    StatKind::Hit,
                    0,
                    0,
                    display_format(subject, StatKind::Hit),
                    "a single hit",
                )
                .unwrap(),
            );
        }
        categories.push(category);
    }
    Catalog { categories, templates, patterns: defaults.patterns }
}

/// One team-hit template per category: far too few squares for a board
pub fn tiny_catalog() -> Catalog {
    let defaults = default_catalog().unwrap();
    let categories: Vec<Category> = (0..BOARD_SIZE)
        .map(|i| Category { id: Uuid::new_v4(), name: format!("Tiny {}", i + 1), description: None })
        .collect();
    let templates = categories
        .iter()
        .map(|c| {
            SquareTemplate::new(
                Uuid::new_v4(),
                c.id,
                SubjectType::Team,
                StatKind::Hit,
                2,
                5,
                display_format(SubjectType::Team, StatKind::Hit),
                "hits by the team",
            )
            .unwrap()
        })
        .collect();
    Catalog { categories, templates, patterns: defaults.patterns }
}

pub async fn register_event(app: &TestApp, api_identifier: &str) -> SportEvent {
    app.data_source.set_roster(api_identifier, roster());
    app.services
        .sport_events
        .register_sport_event(api_identifier)
        .await
        .expect("Failed to register sport event")
}

/// A game over the first five catalog categories and every pattern
pub async fn create_game(app: &TestApp, sport_event_ids: Vec<Uuid>, reroll_allowance: i32) -> BingoGame {
    let category_ids = app.catalog.categories.iter().take(BOARD_SIZE).map(|c| c.id).collect();
    app.services
        .games
        .create_game(NewGame {
            title: "Saturday Night".to_string(),
            category_ids,
            sport_event_ids,
            pattern_ids: None,
            reroll_allowance: Some(reroll_allowance),
        })
        .await
        .expect("Failed to create game")
}

/// Fails if any player appears twice, or any player-less square repeats a (team, stat) pair
pub fn assert_no_duplicates(view: &BoardView) {
    let mut players = Vec::new();
    let mut team_stats = Vec::new();
    for cell in &view.cells {
        let subject = cell.square.subject;
        match subject.player_id() {
            Some(player_id) => {
                assert!(!players.contains(&player_id), "player {} appears twice", player_id);
                players.push(player_id);
            }
            None => {
                let pair = (subject.team_id(), cell.square.stat);
                assert!(!team_stats.contains(&pair), "{:?} appears twice", pair);
                team_stats.push(pair);
            }
        }
    }
}
