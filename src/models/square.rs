use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::BingoError;
use crate::models::play::PlayType;

/// Hockey statistic a square tracks
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum StatKind {
    WonFaceoff,
    WonOffensiveZoneFaceoff,
    WonDefensiveZoneFaceoff,
    Hit,
    Hittee,
    PuckOutOfPlay,
    Icing,
    Offside,
    BlockedShot,
    ShotBlocked,
    PkBlock,
    Penalty,
    StickInfraction,
    Pim,
    MajorPenalty,
    PenaltyDrawn,
    Giveaway,
    DefensiveZoneGiveaway,
    OffensiveZoneGiveaway,
    Takeaway,
    DefensiveZoneTakeaway,
    OffensiveZoneTakeaway,
    ShotOnGoal,
    ShotFromDefensiveZone,
    ShotWrist,
    ShotTip,
    ShotSnap,
    ShotSlap,
    ShotBackhand,
    Post,
    Goal,
    Point,
    PowerPlayGoal,
    ShortHandedGoal,
}

impl StatKind {
    pub const ALL: [StatKind; 34] = [
        StatKind::WonFaceoff,
        StatKind::WonOffensiveZoneFaceoff,
        StatKind::WonDefensiveZoneFaceoff,
        StatKind::Hit,
        StatKind::Hittee,
        StatKind::PuckOutOfPlay,
        StatKind::Icing,
        StatKind::Offside,
        StatKind::BlockedShot,
        StatKind::ShotBlocked,
        StatKind::PkBlock,
        StatKind::Penalty,
        StatKind::StickInfraction,
        StatKind::Pim,
        StatKind::MajorPenalty,
        StatKind::PenaltyDrawn,
        StatKind::Giveaway,
        StatKind::DefensiveZoneGiveaway,
        StatKind::OffensiveZoneGiveaway,
        StatKind::Takeaway,
        StatKind::DefensiveZoneTakeaway,
        StatKind::OffensiveZoneTakeaway,
        StatKind::ShotOnGoal,
        StatKind::ShotFromDefensiveZone,
        StatKind::ShotWrist,
        StatKind::ShotTip,
        StatKind::ShotSnap,
        StatKind::ShotSlap,
        StatKind::ShotBackhand,
        StatKind::Post,
        StatKind::Goal,
        StatKind::Point,
        StatKind::PowerPlayGoal,
        StatKind::ShortHandedGoal,
    ];

    /// Raw stat key as stored and as substituted for `{stat}`
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::WonFaceoff => "won-faceoff",
            StatKind::WonOffensiveZoneFaceoff => "won-offensive-zone-faceoff",
            StatKind::WonDefensiveZoneFaceoff => "won-defensive-zone-faceoff",
            StatKind::Hit => "hit",
            StatKind::Hittee => "hittee",
            StatKind::PuckOutOfPlay => "puck-out-of-play",
            StatKind::Icing => "icing",
            StatKind::Offside => "offside",
            StatKind::BlockedShot => "blocked-shot",
            StatKind::ShotBlocked => "shot-blocked",
            StatKind::PkBlock => "pk-block",
            StatKind::Penalty => "penalty",
            StatKind::StickInfraction => "stick-infraction",
            StatKind::Pim => "pim",
            StatKind::MajorPenalty => "major-penalty",
            StatKind::PenaltyDrawn => "penalty-drawn",
            StatKind::Giveaway => "giveaway",
            StatKind::DefensiveZoneGiveaway => "defensive-zone-giveaway",
            StatKind::OffensiveZoneGiveaway => "offensive-zone-giveaway",
            StatKind::Takeaway => "takeaway",
            StatKind::DefensiveZoneTakeaway => "defensive-zone-takeaway",
            StatKind::OffensiveZoneTakeaway => "offensive-zone-takeaway",
            StatKind::ShotOnGoal => "shot-on-goal",
            StatKind::ShotFromDefensiveZone => "shot-from-defensive-zone",
            StatKind::ShotWrist => "shot-wrist",
            StatKind::ShotTip => "shot-tip",
            StatKind::ShotSnap => "shot-snap",
            StatKind::ShotSlap => "shot-slap",
            StatKind::ShotBackhand => "shot-backhand",
            StatKind::Post => "post",
            StatKind::Goal => "goal",
            StatKind::Point => "point",
            StatKind::PowerPlayGoal => "power-play-goal",
            StatKind::ShortHandedGoal => "short-handed-goal",
        }
    }

    /// Plural phrase used in generated display formats
    pub fn friendly_name(&self) -> &'static str {
        match self {
            StatKind::WonFaceoff => "faceoffs won",
            StatKind::WonOffensiveZoneFaceoff => "offensive zone faceoffs won",
            StatKind::WonDefensiveZoneFaceoff => "defensive zone faceoffs won",
            StatKind::Hit => "hits",
            StatKind::Hittee => "hits taken",
            StatKind::PuckOutOfPlay => "pucks out of play",
            StatKind::Icing => "icings",
            StatKind::Offside => "offsides",
            StatKind::BlockedShot => "shot blocks",
            StatKind::ShotBlocked => "shots blocked",
            StatKind::PkBlock => "shot blocks on the penalty kill",
            StatKind::Penalty => "penalties",
            StatKind::StickInfraction => "stick infractions",
            StatKind::Pim => "penalty minutes",
            StatKind::MajorPenalty => "major penalties",
            StatKind::PenaltyDrawn => "penalties drawn",
            StatKind::Giveaway => "giveaways",
            StatKind::DefensiveZoneGiveaway => "defensive zone giveaways",
            StatKind::OffensiveZoneGiveaway => "offensive zone giveaways",
            StatKind::Takeaway => "takeaways",
            StatKind::DefensiveZoneTakeaway => "defensive zone takeaways",
            StatKind::OffensiveZoneTakeaway => "offensive zone takeaways",
            StatKind::ShotOnGoal => "shots",
            StatKind::ShotFromDefensiveZone => "shots from the defensive zone",
            StatKind::ShotWrist => "wrist shots",
            StatKind::ShotTip => "tipped shots",
            StatKind::ShotSnap => "snap shots",
            StatKind::ShotSlap => "slap shots",
            StatKind::ShotBackhand => "backhand shots",
            StatKind::Post => "posts hit",
            StatKind::Goal => "goals",
            StatKind::Point => "points",
            StatKind::PowerPlayGoal => "power play goals",
            StatKind::ShortHandedGoal => "short handed goals",
        }
    }

    /// The only play type able to move a square of this stat
    pub fn play_type(&self) -> PlayType {
        match self {
            StatKind::WonFaceoff
            | StatKind::WonOffensiveZoneFaceoff
            | StatKind::WonDefensiveZoneFaceoff => PlayType::Faceoff,
            StatKind::Hit | StatKind::Hittee => PlayType::Hit,
            StatKind::PuckOutOfPlay | StatKind::Icing | StatKind::Offside => PlayType::Stoppage,
            StatKind::BlockedShot | StatKind::ShotBlocked | StatKind::PkBlock => {
                PlayType::BlockedShot
            }
            StatKind::Penalty
            | StatKind::StickInfraction
            | StatKind::Pim
            | StatKind::MajorPenalty
            | StatKind::PenaltyDrawn => PlayType::Penalty,
            StatKind::Giveaway
            | StatKind::DefensiveZoneGiveaway
            | StatKind::OffensiveZoneGiveaway => PlayType::Giveaway,
            StatKind::Takeaway
            | StatKind::DefensiveZoneTakeaway
            | StatKind::OffensiveZoneTakeaway => PlayType::Takeaway,
            StatKind::ShotOnGoal
            | StatKind::ShotFromDefensiveZone
            | StatKind::ShotWrist
            | StatKind::ShotTip
            | StatKind::ShotSnap
            | StatKind::ShotSlap
            | StatKind::ShotBackhand => PlayType::ShotOnGoal,
            StatKind::Post => PlayType::MissedShot,
            StatKind::Goal
            | StatKind::Point
            | StatKind::PowerPlayGoal
            | StatKind::ShortHandedGoal => PlayType::Goal,
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKind {
    type Err = BingoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatKind::ALL
            .iter()
            .copied()
            .find(|stat| stat.as_str() == s)
            .ok_or_else(|| BingoError::InvalidData(format!("unknown stat '{}'", s)))
    }
}

/// Who a template's statistic is about
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Forward,
    Defense,
    Goalie,
    Team,
    GameWide,
}

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Forward => "forward",
            SubjectType::Defense => "defense",
            SubjectType::Goalie => "goalie",
            SubjectType::Team => "team",
            SubjectType::GameWide => "game_wide",
        }
    }

    /// Whether a roster position code can fill this subject type.
    /// Forwards are listed either as `F` or by their lane (`L`, `R`, `C`).
    pub fn accepts_position(&self, position: &str) -> bool {
        match self {
            SubjectType::Forward => matches!(position, "F" | "L" | "R" | "C"),
            SubjectType::Defense => position == "D",
            SubjectType::Goalie => position == "G",
            SubjectType::Team | SubjectType::GameWide => false,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, SubjectType::Forward | SubjectType::Defense | SubjectType::Goalie)
    }
}

impl FromStr for SubjectType {
    type Err = BingoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(SubjectType::Forward),
            "defense" => Ok(SubjectType::Defense),
            "goalie" => Ok(SubjectType::Goalie),
            "team" => Ok(SubjectType::Team),
            "game_wide" => Ok(SubjectType::GameWide),
            other => Err(BingoError::InvalidData(format!("unknown subject type '{}'", other))),
        }
    }
}

/// Immutable catalog entry squares are drawn from
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SquareTemplate {
    pub id: Uuid,
    pub category_id: Uuid,
    pub subject_type: SubjectType,
    pub stat: StatKind,
    pub range_min: i32,
    pub range_max: i32,
    pub display_format: String,
    pub description: String,
}

impl SquareTemplate {
    pub fn new(
        id: Uuid,
        category_id: Uuid,
        subject_type: SubjectType,
        stat: StatKind,
        range_min: i32,
        range_max: i32,
        display_format: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, BingoError> {
        if range_min < 0 || range_min > range_max {
            return Err(BingoError::InvalidData(format!(
                "invalid range {}..={} for {} template",
                range_min, range_max, stat
            )));
        }
        Ok(Self {
            id,
            category_id,
            subject_type,
            stat,
            range_min,
            range_max,
            display_format: display_format.into(),
            description: description.into(),
        })
    }
}

/// The player, team, or neither a square is about.
/// A player subject always carries the player's team.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SquareSubject {
    GameWide,
    Team { team_id: i64 },
    Player { player_id: i64, team_id: i64 },
}

impl SquareSubject {
    pub fn player_id(&self) -> Option<i64> {
        match self {
            SquareSubject::Player { player_id, .. } => Some(*player_id),
            _ => None,
        }
    }

    pub fn team_id(&self) -> Option<i64> {
        match self {
            SquareSubject::GameWide => None,
            SquareSubject::Team { team_id } | SquareSubject::Player { team_id, .. } => {
                Some(*team_id)
            }
        }
    }

    /// Rebuilds a subject from nullable storage columns
    pub fn from_columns(player_id: Option<i64>, team_id: Option<i64>) -> Result<Self, BingoError> {
        match (player_id, team_id) {
            (None, None) => Ok(SquareSubject::GameWide),
            (None, Some(team_id)) => Ok(SquareSubject::Team { team_id }),
            (Some(player_id), Some(team_id)) => Ok(SquareSubject::Player { player_id, team_id }),
            (Some(player_id), None) => Err(BingoError::InvalidData(format!(
                "player {} stored without a team",
                player_id
            ))),
        }
    }
}

/// Concrete square bound to one sport event
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSquare {
    pub id: Uuid,
    pub template_id: Option<Uuid>,
    pub sport_event_id: Uuid,
    pub stat: StatKind,
    pub subject: SquareSubject,
    /// Always a whole number plus one half, so a count can never tie it
    pub target_value: f64,
    current_value: f64,
    pub description: String,
}

impl ResolvedSquare {
    pub fn new(
        id: Uuid,
        template_id: Option<Uuid>,
        sport_event_id: Uuid,
        stat: StatKind,
        subject: SquareSubject,
        target_value: f64,
        current_value: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            template_id,
            sport_event_id,
            stat,
            subject,
            target_value,
            current_value,
            description: description.into(),
        }
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn has_occurred(&self) -> bool {
        self.current_value >= self.target_value
    }

    pub fn record(&mut self, amount: f64) {
        self.current_value += amount;
    }

    pub fn snapshot(&self) -> SquareSnapshot {
        SquareSnapshot {
            id: self.id,
            stat: self.stat,
            subject: self.subject,
            target_value: self.target_value,
            current_value: self.current_value,
            has_occurred: self.has_occurred(),
            sport_event_id: self.sport_event_id,
            description: self.description.clone(),
        }
    }
}

/// Serializable view of a square including its derived state
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SquareSnapshot {
    pub id: Uuid,
    pub stat: StatKind,
    pub subject: SquareSubject,
    pub target_value: f64,
    pub current_value: f64,
    pub has_occurred: bool,
    pub sport_event_id: Uuid,
    pub description: String,
}
