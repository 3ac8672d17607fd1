use crate::models::common::{RinkSide, TeamSide};
use crate::models::play::Play;
use crate::models::sport_event::PlayByPlay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    PowerPlay,
    ShortHanded,
    /// Also reported when the play lacks the data to tell
    Even,
}

/// Skaters on the ice per end of the rink, from `situationCode` digits 1 and 2
fn skaters_by_side(situation_code: &str) -> Option<(u32, u32)> {
    let mut digits = situation_code.chars().skip(1);
    let left = digits.next()?.to_digit(10)?;
    let right = digits.next()?.to_digit(10)?;
    Some((left, right))
}

fn rink_side_of(team_id: i64, play: &Play, pbp: &PlayByPlay) -> Option<RinkSide> {
    let home_side = play.home_team_defending_side?;
    match pbp.side_of(team_id)? {
        TeamSide::Home => Some(home_side),
        TeamSide::Away => Some(home_side.opposite()),
    }
}

pub fn strength_of(team_id: i64, play: &Play, pbp: &PlayByPlay) -> Strength {
    let (Some(side), Some((left, right))) = (
        rink_side_of(team_id, play, pbp),
        skaters_by_side(&play.situation_code),
    ) else {
        return Strength::Even;
    };
    let (own, other) = match side {
        RinkSide::Left => (left, right),
        RinkSide::Right => (right, left),
    };
    match own.cmp(&other) {
        std::cmp::Ordering::Greater => Strength::PowerPlay,
        std::cmp::Ordering::Less => Strength::ShortHanded,
        std::cmp::Ordering::Equal => Strength::Even,
    }
}
