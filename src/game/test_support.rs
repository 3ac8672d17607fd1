//! Fixtures shared by the engine unit tests.

use uuid::Uuid;

use crate::game::catalog::display_format;
use crate::models::sport_event::{GameRoster, RosterPlayer, SeasonStats, TeamInfo};
use crate::models::square::{SquareTemplate, StatKind, SubjectType};

pub const HOME_TEAM_ID: i64 = 10;
pub const AWAY_TEAM_ID: i64 = 6;

const FORWARD_GOALS: [i32; 8] = [12, 10, 9, 8, 3, 1, 0, 0];
const FORWARD_POSITIONS: [&str; 4] = ["C", "L", "R", "F"];

fn skater(player_id: i64, team_id: i64, name: String, position: &str, goals: i32) -> RosterPlayer {
    RosterPlayer {
        player_id,
        team_id,
        name,
        position: position.to_string(),
        season: SeasonStats {
            goals,
            hits: (player_id % 7) as i32,
            ..SeasonStats::default()
        },
    }
}

fn team_players(team_id: i64, abbrev: &str, base_id: i64) -> Vec<RosterPlayer> {
    let forwards = FORWARD_GOALS.iter().enumerate().map(|(i, goals)| {
        skater(
            base_id + i as i64,
            team_id,
            format!("{} Forward {}", abbrev, i + 1),
            FORWARD_POSITIONS[i % FORWARD_POSITIONS.len()],
            *goals,
        )
    });
    let defense = (0..5).map(|i| {
        skater(base_id + 50 + i, team_id, format!("{} Defense {}", abbrev, i + 1), "D", 1)
    });
    forwards.chain(defense).collect()
}

/// BOS at TOR: eight forwards and five defensemen a side, no goalies
pub fn roster() -> GameRoster {
    let mut players = team_players(HOME_TEAM_ID, "TOR", 8_470_000);
    players.extend(team_players(AWAY_TEAM_ID, "BOS", 8_480_000));
    GameRoster {
        home_team: TeamInfo {
            id: HOME_TEAM_ID,
            name: "Maple Leafs".to_string(),
            abbrev: "TOR".to_string(),
        },
        away_team: TeamInfo {
            id: AWAY_TEAM_ID,
            name: "Bruins".to_string(),
            abbrev: "BOS".to_string(),
        },
        start_time: None,
        players,
    }
}

pub fn team_template(category_id: Uuid, stat: StatKind, range_min: i32, range_max: i32) -> SquareTemplate {
    SquareTemplate::new(
        Uuid::new_v4(),
        category_id,
        SubjectType::Team,
        stat,
        range_min,
        range_max,
        display_format(SubjectType::Team, stat),
        "team test template",
    )
    .unwrap()
}
