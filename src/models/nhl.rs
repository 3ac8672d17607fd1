//! Wire formats of the NHL gamecenter API and their conversion into snapshots.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::models::common::RinkSide;
use crate::models::play::{GameClock, PeriodTime, Play, PlayKind};
use crate::models::sport_event::{GameRoster, PlayByPlay, RosterPlayer, ScheduledGame, SeasonStats, TeamInfo};

const REGULATION_PERIOD_SECONDS: u32 = 20 * 60;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LocalizedName {
    #[serde(default)]
    pub default: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NhlTeam {
    pub id: i64,
    #[serde(default, alias = "commonName")]
    pub name: LocalizedName,
    #[serde(default)]
    pub abbrev: String,
}

impl From<NhlTeam> for TeamInfo {
    fn from(team: NhlTeam) -> Self {
        TeamInfo {
            id: team.id,
            name: team.name.default,
            abbrev: team.abbrev,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDescriptor {
    pub number: i32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NhlPlay {
    pub event_id: i64,
    pub period: Option<i32>,
    pub period_descriptor: Option<PeriodDescriptor>,
    pub time_in_period: Option<String>,
    pub time_remaining: Option<String>,
    #[serde(default)]
    pub situation_code: String,
    pub home_team_defending_side: Option<String>,
    pub type_desc_key: String,
    pub details: Option<serde_json::Value>,
}

impl NhlPlay {
    fn period_number(&self) -> Option<i32> {
        self.period
            .or_else(|| self.period_descriptor.as_ref().map(|p| p.number))
    }

    /// Countdown clock; derived from elapsed time when the feed omits it
    fn countdown(&self) -> Option<PeriodTime> {
        if let Some(remaining) = self.time_remaining.as_deref() {
            return remaining.parse().ok();
        }
        let elapsed: PeriodTime = self.time_in_period.as_deref()?.parse().ok()?;
        Some(PeriodTime::from_seconds(
            REGULATION_PERIOD_SECONDS.saturating_sub(elapsed.seconds()),
        ))
    }

    pub fn into_play(self) -> Result<Play, String> {
        let period = self
            .period_number()
            .ok_or_else(|| format!("play {} has no period", self.event_id))?;
        let time = self
            .countdown()
            .ok_or_else(|| format!("play {} has no readable clock", self.event_id))?;
        let side = match self.home_team_defending_side.as_deref() {
            Some("left") => Some(RinkSide::Left),
            Some("right") => Some(RinkSide::Right),
            _ => None,
        };
        let kind = PlayKind::from_parts(&self.type_desc_key, self.details)
            .map_err(|e| format!("play {} ({}): {}", self.event_id, self.type_desc_key, e))?;
        Ok(Play {
            event_id: self.event_id,
            clock: GameClock::new(period, time),
            situation_code: self.situation_code,
            home_team_defending_side: side,
            kind,
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlayByPlayResponse {
    pub home_team: NhlTeam,
    pub away_team: NhlTeam,
    #[serde(default)]
    pub plays: Vec<NhlPlay>,
}

impl PlayByPlayResponse {
    pub fn into_snapshot(self) -> PlayByPlay {
        let mut plays = Vec::with_capacity(self.plays.len());
        for raw in self.plays {
            match raw.into_play() {
                Ok(play) => plays.push(play),
                Err(e) => tracing::warn!("Skipping unreadable play: {}", e),
            }
        }
        PlayByPlay {
            home_team: self.home_team.into(),
            away_team: self.away_team.into(),
            plays,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SkaterSeasonStats {
    pub player_id: i64,
    pub team_id: i64,
    #[serde(default)]
    pub name: LocalizedName,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub goals: i32,
    #[serde(default)]
    pub assists: i32,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub pim: i32,
    #[serde(default)]
    pub shots: i32,
    #[serde(default)]
    pub hits: i32,
    #[serde(default)]
    pub power_play_goals: i32,
    #[serde(default)]
    pub faceoff_win_pctg: f64,
}

impl From<SkaterSeasonStats> for RosterPlayer {
    fn from(s: SkaterSeasonStats) -> Self {
        RosterPlayer {
            player_id: s.player_id,
            team_id: s.team_id,
            name: s.name.default,
            // Goalie listings sometimes omit the position
            position: if s.position.is_empty() { "G".to_string() } else { s.position },
            season: SeasonStats {
                goals: s.goals,
                assists: s.assists,
                points: s.points,
                pim: s.pim,
                shots: s.shots,
                hits: s.hits,
                power_play_goals: s.power_play_goals,
                faceoff_win_pctg: s.faceoff_win_pctg,
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Matchup {
    #[serde(default)]
    pub skater_season_stats: Vec<SkaterSeasonStats>,
    #[serde(default)]
    pub goalie_season_stats: Vec<SkaterSeasonStats>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LandingResponse {
    pub home_team: NhlTeam,
    pub away_team: NhlTeam,
    #[serde(rename = "startTimeUTC")]
    pub start_time_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub matchup: Matchup,
}

impl LandingResponse {
    pub fn into_roster(self) -> GameRoster {
        let players = self
            .matchup
            .skater_season_stats
            .into_iter()
            .chain(self.matchup.goalie_season_stats)
            .map(RosterPlayer::from)
            .collect();
        GameRoster {
            home_team: self.home_team.into(),
            away_team: self.away_team.into(),
            start_time: self.start_time_utc,
            players,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardGame {
    pub id: i64,
    pub home_team: NhlTeam,
    pub away_team: NhlTeam,
    #[serde(rename = "startTimeUTC")]
    pub start_time_utc: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GamesByDate {
    pub date: NaiveDate,
    #[serde(default)]
    pub games: Vec<ScoreboardGame>,
}

/// `scoreboard/{date}` lists games for a window of days around the date
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardResponse {
    #[serde(default)]
    pub games_by_date: Vec<GamesByDate>,
}

impl ScoreboardResponse {
    /// Games scheduled on `date`, in puck-drop order
    pub fn games_on(self, date: NaiveDate) -> Vec<ScheduledGame> {
        let mut games: Vec<ScheduledGame> = self
            .games_by_date
            .into_iter()
            .filter(|day| day.date == date)
            .flat_map(|day| day.games)
            .map(|game| {
                let home_team = game.home_team.name.default;
                let away_team = game.away_team.name.default;
                ScheduledGame {
                    api_identifier: game.id.to_string(),
                    game_name: format!("{} @ {}", away_team, home_team),
                    home_team,
                    away_team,
                    start_time: game.start_time_utc,
                }
            })
            .collect();
        games.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        games
    }
}
