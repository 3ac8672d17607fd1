use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::BingoError;
use crate::models::common::RinkSide;

/// Play types that can move a square
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PlayType {
    Faceoff,
    Hit,
    Stoppage,
    BlockedShot,
    Penalty,
    Giveaway,
    Takeaway,
    ShotOnGoal,
    Goal,
    MissedShot,
}

impl PlayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayType::Faceoff => "faceoff",
            PlayType::Hit => "hit",
            PlayType::Stoppage => "stoppage",
            PlayType::BlockedShot => "blocked-shot",
            PlayType::Penalty => "penalty",
            PlayType::Giveaway => "giveaway",
            PlayType::Takeaway => "takeaway",
            PlayType::ShotOnGoal => "shot-on-goal",
            PlayType::Goal => "goal",
            PlayType::MissedShot => "missed-shot",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "faceoff" => Some(PlayType::Faceoff),
            "hit" => Some(PlayType::Hit),
            "stoppage" => Some(PlayType::Stoppage),
            "blocked-shot" => Some(PlayType::BlockedShot),
            "penalty" => Some(PlayType::Penalty),
            "giveaway" => Some(PlayType::Giveaway),
            "takeaway" => Some(PlayType::Takeaway),
            "shot-on-goal" => Some(PlayType::ShotOnGoal),
            "goal" => Some(PlayType::Goal),
            "missed-shot" => Some(PlayType::MissedShot),
            _ => None,
        }
    }
}

/// Zone a play happened in, relative to the event owner
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    #[serde(rename = "O")]
    Offensive,
    #[serde(rename = "D")]
    Defensive,
    #[serde(rename = "N")]
    Neutral,
}

/// Clock reading within a period, `mm:ss`. The clock counts down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodTime(u32);

impl PeriodTime {
    pub fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }
}

impl FromStr for PeriodTime {
    type Err = BingoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BingoError::InvalidData(format!("invalid period time '{}'", s));
        let (minutes, seconds) = s.trim().split_once(':').ok_or_else(invalid)?;
        let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
        let seconds: u32 = seconds.parse().map_err(|_| invalid())?;
        if seconds >= 60 {
            return Err(invalid());
        }
        minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for PeriodTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for PeriodTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Position in a game: later periods first, then less time remaining.
/// Also serves as the per-sport-event evaluation cursor.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameClock {
    pub period: i32,
    pub time_in_period: PeriodTime,
}

impl GameClock {
    pub fn new(period: i32, time_in_period: PeriodTime) -> Self {
        Self { period, time_in_period }
    }

    pub fn parse(period: i32, time_in_period: &str) -> Result<Self, BingoError> {
        Ok(Self::new(period, time_in_period.parse()?))
    }

    /// Cursor for an event nothing has been evaluated for yet
    pub fn before_start() -> Self {
        Self::new(0, PeriodTime::from_seconds(0))
    }
}

impl Ord for GameClock {
    fn cmp(&self, other: &Self) -> Ordering {
        self.period
            .cmp(&other.period)
            .then_with(|| other.time_in_period.cmp(&self.time_in_period))
    }
}

impl PartialOrd for GameClock {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{} {}", self.period, self.time_in_period)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FaceoffDetails {
    pub event_owner_team_id: i64,
    pub winning_player_id: Option<i64>,
    pub losing_player_id: Option<i64>,
    pub zone_code: Option<Zone>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HitDetails {
    pub event_owner_team_id: i64,
    pub hitting_player_id: Option<i64>,
    pub hittee_player_id: Option<i64>,
    pub zone_code: Option<Zone>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoppageDetails {
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockedShotDetails {
    /// Team of the blocking player
    pub event_owner_team_id: i64,
    pub blocking_player_id: Option<i64>,
    #[serde(alias = "shooterPlayerId")]
    pub shooting_player_id: Option<i64>,
    pub zone_code: Option<Zone>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyDetails {
    pub event_owner_team_id: i64,
    pub committed_by_player_id: Option<i64>,
    pub drawn_by_player_id: Option<i64>,
    pub desc_key: String,
    /// Minutes
    pub duration: i32,
    pub zone_code: Option<Zone>,
}

/// Giveaway or takeaway
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PossessionDetails {
    pub event_owner_team_id: i64,
    pub player_id: Option<i64>,
    pub zone_code: Option<Zone>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShotDetails {
    pub event_owner_team_id: i64,
    pub shooting_player_id: Option<i64>,
    pub shot_type: Option<String>,
    pub zone_code: Option<Zone>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalDetails {
    pub event_owner_team_id: i64,
    pub scoring_player_id: Option<i64>,
    pub assist1_player_id: Option<i64>,
    pub assist2_player_id: Option<i64>,
    pub shot_type: Option<String>,
    pub zone_code: Option<Zone>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MissedShotDetails {
    pub event_owner_team_id: i64,
    pub shooting_player_id: Option<i64>,
    pub reason: Option<String>,
    pub zone_code: Option<Zone>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayKind {
    Faceoff(FaceoffDetails),
    Hit(HitDetails),
    Stoppage(StoppageDetails),
    BlockedShot(BlockedShotDetails),
    Penalty(PenaltyDetails),
    Giveaway(PossessionDetails),
    Takeaway(PossessionDetails),
    ShotOnGoal(ShotDetails),
    Goal(GoalDetails),
    MissedShot(MissedShotDetails),
    /// Play types no stat is sourced from (period-start, delayed-penalty, ...)
    Other(String),
}

impl PlayKind {
    /// Builds a typed play from its type key and raw details payload
    pub fn from_parts(
        type_key: &str,
        details: Option<serde_json::Value>,
    ) -> Result<Self, serde_json::Error> {
        let Some(play_type) = PlayType::from_key(type_key) else {
            return Ok(PlayKind::Other(type_key.to_string()));
        };
        let details = details.unwrap_or(serde_json::Value::Null);
        Ok(match play_type {
            PlayType::Faceoff => PlayKind::Faceoff(serde_json::from_value(details)?),
            PlayType::Hit => PlayKind::Hit(serde_json::from_value(details)?),
            PlayType::Stoppage => PlayKind::Stoppage(serde_json::from_value(details)?),
            PlayType::BlockedShot => PlayKind::BlockedShot(serde_json::from_value(details)?),
            PlayType::Penalty => PlayKind::Penalty(serde_json::from_value(details)?),
            PlayType::Giveaway => PlayKind::Giveaway(serde_json::from_value(details)?),
            PlayType::Takeaway => PlayKind::Takeaway(serde_json::from_value(details)?),
            PlayType::ShotOnGoal => PlayKind::ShotOnGoal(serde_json::from_value(details)?),
            PlayType::Goal => PlayKind::Goal(serde_json::from_value(details)?),
            PlayType::MissedShot => PlayKind::MissedShot(serde_json::from_value(details)?),
        })
    }

    pub fn play_type(&self) -> Option<PlayType> {
        match self {
            PlayKind::Faceoff(_) => Some(PlayType::Faceoff),
            PlayKind::Hit(_) => Some(PlayType::Hit),
            PlayKind::Stoppage(_) => Some(PlayType::Stoppage),
            PlayKind::BlockedShot(_) => Some(PlayType::BlockedShot),
            PlayKind::Penalty(_) => Some(PlayType::Penalty),
            PlayKind::Giveaway(_) => Some(PlayType::Giveaway),
            PlayKind::Takeaway(_) => Some(PlayType::Takeaway),
            PlayKind::ShotOnGoal(_) => Some(PlayType::ShotOnGoal),
            PlayKind::Goal(_) => Some(PlayType::Goal),
            PlayKind::MissedShot(_) => Some(PlayType::MissedShot),
            PlayKind::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Play {
    pub event_id: i64,
    pub clock: GameClock,
    /// Four digits: away goalie, away skaters, home skaters, home goalie
    pub situation_code: String,
    pub home_team_defending_side: Option<RinkSide>,
    pub kind: PlayKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn period_time_parses_and_formats() {
        let time: PeriodTime = "09:45".parse().unwrap();
        assert_eq!(time.seconds(), 585);
        assert_eq!(time.to_string(), "09:45");
        assert!("9".parse::<PeriodTime>().is_err());
        assert!("10:75".parse::<PeriodTime>().is_err());
        assert!("10:60".parse::<PeriodTime>().is_err());
    }

    #[test]
    fn huge_minutes_are_invalid_data() {
        assert!(matches!(
            "71582789:00".parse::<PeriodTime>(),
            Err(BingoError::InvalidData(_))
        ));
        assert!("4294967295:59".parse::<PeriodTime>().is_err());
        assert_eq!("71582788:00".parse::<PeriodTime>().unwrap().seconds(), 71_582_788 * 60);
    }

    #[test]
    fn later_clock_has_less_time_remaining() {
        let cursor = GameClock::parse(2, "10:00").unwrap();
        assert!(GameClock::parse(2, "09:45").unwrap() > cursor);
        assert!(GameClock::parse(2, "15:00").unwrap() < cursor);
        assert!(GameClock::parse(3, "19:59").unwrap() > cursor);
        assert!(GameClock::before_start() < GameClock::parse(1, "20:00").unwrap());
    }

    #[test]
    fn unknown_play_types_are_kept_as_other() {
        let kind = PlayKind::from_parts("period-start", None).unwrap();
        assert_eq!(kind, PlayKind::Other("period-start".to_string()));
        assert_eq!(kind.play_type(), None);
    }

    #[test]
    fn blocked_shot_accepts_shooter_alias() {
        let kind = PlayKind::from_parts(
            "blocked-shot",
            Some(json!({
                "eventOwnerTeamId": 10,
                "blockingPlayerId": 1,
                "shooterPlayerId": 2,
                "zoneCode": "D"
            })),
        )
        .unwrap();
        match kind {
            PlayKind::BlockedShot(details) => {
                assert_eq!(details.shooting_player_id, Some(2));
                assert_eq!(details.zone_code, Some(Zone::Defensive));
            }
            other => panic!("unexpected play {:?}", other),
        }
    }

    #[test]
    fn known_play_without_details_is_an_error() {
        assert!(PlayKind::from_parts("hit", None).is_err());
    }
}
