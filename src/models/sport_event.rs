use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::common::TeamSide;
use crate::models::play::{GameClock, Play};
use crate::models::square::{StatKind, SubjectType};

/// One registered live game and how far its plays have been folded into squares
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SportEvent {
    pub id: Uuid,
    pub api_identifier: String,
    pub home_team: String,
    pub away_team: String,
    pub start_time: DateTime<Utc>,
    pub cursor: GameClock,
}

/// A game on the league schedule that can be registered as a sport event
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScheduledGame {
    pub api_identifier: String,
    pub home_team: String,
    pub away_team: String,
    /// "Away @ Home"
    pub game_name: String,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TeamInfo {
    pub id: i64,
    pub name: String,
    pub abbrev: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SeasonStats {
    pub goals: i32,
    pub assists: i32,
    pub points: i32,
    pub pim: i32,
    pub shots: i32,
    pub hits: i32,
    pub power_play_goals: i32,
    pub faceoff_win_pctg: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RosterPlayer {
    pub player_id: i64,
    pub team_id: i64,
    pub name: String,
    pub position: String,
    #[serde(default)]
    pub season: SeasonStats,
}

impl RosterPlayer {
    /// Season value used to rank players for a stat; higher ranks first.
    /// Discipline-framed stats rank the cleanest players first.
    pub fn ranking_for(&self, stat: StatKind) -> f64 {
        let s = &self.season;
        match stat {
            StatKind::WonFaceoff
            | StatKind::WonOffensiveZoneFaceoff
            | StatKind::WonDefensiveZoneFaceoff => s.faceoff_win_pctg,
            StatKind::Hit => s.hits as f64,
            StatKind::ShotOnGoal => s.shots as f64,
            StatKind::Goal | StatKind::ShortHandedGoal => s.goals as f64,
            StatKind::PowerPlayGoal => s.power_play_goals as f64,
            StatKind::Point => s.points as f64,
            StatKind::Pim
            | StatKind::MajorPenalty
            | StatKind::Penalty
            | StatKind::StickInfraction => s.pim as f64,
            StatKind::PenaltyDrawn | StatKind::PkBlock => -(s.pim as f64),
            _ => 0.0,
        }
    }
}

/// Roster snapshot for one external game
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameRoster {
    pub home_team: TeamInfo,
    pub away_team: TeamInfo,
    pub start_time: Option<DateTime<Utc>>,
    pub players: Vec<RosterPlayer>,
}

impl GameRoster {
    pub fn team(&self, side: TeamSide) -> &TeamInfo {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }

    pub fn team_by_id(&self, team_id: i64) -> Option<&TeamInfo> {
        [&self.home_team, &self.away_team]
            .into_iter()
            .find(|team| team.id == team_id)
    }

    /// Players of one team able to fill a subject type, in roster order
    pub fn eligible_players(&self, team_id: i64, subject_type: SubjectType) -> Vec<&RosterPlayer> {
        self.players
            .iter()
            .filter(|p| p.team_id == team_id && subject_type.accepts_position(&p.position))
            .collect()
    }

    /// `AWY@HOM`
    pub fn matchup(&self) -> String {
        format!("{}@{}", self.away_team.abbrev, self.home_team.abbrev)
    }
}

/// Play-by-play snapshot for one external game
#[derive(Debug, Clone, PartialEq)]
pub struct PlayByPlay {
    pub home_team: TeamInfo,
    pub away_team: TeamInfo,
    pub plays: Vec<Play>,
}

impl PlayByPlay {
    pub fn side_of(&self, team_id: i64) -> Option<TeamSide> {
        if team_id == self.home_team.id {
            Some(TeamSide::Home)
        } else if team_id == self.away_team.id {
            Some(TeamSide::Away)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, team_id: i64) -> Option<i64> {
        self.side_of(team_id).map(|side| match side.opposite() {
            TeamSide::Home => self.home_team.id,
            TeamSide::Away => self.away_team.id,
        })
    }
}
