//! Folds play-by-play into square counters.
//!
//! Each qualifying play is turned into [`StatCredit`]s, which are then applied
//! to every unresolved square of the same stat whose subject they match.

use uuid::Uuid;

use crate::game::situation::{strength_of, Strength};
use crate::models::play::{GameClock, Play, PlayKind, Zone};
use crate::models::sport_event::PlayByPlay;
use crate::models::square::{ResolvedSquare, SquareSubject, StatKind};

const STICK_INFRACTIONS: [&str; 4] = ["slashing", "hooking", "tripping", "high-sticking"];
const PUCK_OUT_OF_PLAY: [&str; 3] = ["puck-in-netting", "puck-in-crowd", "puck-in-benches"];
const POST_REASONS: [&str; 2] = ["hit-crossbar", "hit-post"];
const MAJOR_PENALTY_MINUTES: i32 = 5;

/// One stat increment produced by a play
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatCredit {
    pub stat: StatKind,
    pub player_id: Option<i64>,
    pub team_id: Option<i64>,
    pub amount: f64,
}

impl StatCredit {
    fn new(stat: StatKind, player_id: Option<i64>, team_id: Option<i64>) -> Self {
        Self { stat, player_id, team_id, amount: 1.0 }
    }

    /// Credits with neither player nor team apply to every square of the stat
    pub fn matches(&self, square: &ResolvedSquare) -> bool {
        if square.stat != self.stat {
            return false;
        }
        if self.player_id.is_none() && self.team_id.is_none() {
            return true;
        }
        match square.subject {
            SquareSubject::GameWide => true,
            SquareSubject::Team { team_id } => self.team_id == Some(team_id),
            SquareSubject::Player { player_id, .. } => self.player_id == Some(player_id),
        }
    }
}

fn shot_type_stat(shot_type: &str) -> Option<StatKind> {
    match shot_type {
        "wrist" => Some(StatKind::ShotWrist),
        "tip-in" => Some(StatKind::ShotTip),
        "snap" => Some(StatKind::ShotSnap),
        "slap" => Some(StatKind::ShotSlap),
        "backhand" => Some(StatKind::ShotBackhand),
        _ => None,
    }
}

/// Every credit a single play produces
pub fn credits_for(play: &Play, pbp: &PlayByPlay) -> Vec<StatCredit> {
    let mut credits = Vec::new();
    let mut push = |stat, player_id, team_id| credits.push(StatCredit::new(stat, player_id, team_id));

    match &play.kind {
        PlayKind::Faceoff(d) => {
            let owner = Some(d.event_owner_team_id);
            push(StatKind::WonFaceoff, d.winning_player_id, owner);
            match d.zone_code {
                Some(Zone::Offensive) => push(StatKind::WonOffensiveZoneFaceoff, d.winning_player_id, owner),
                Some(Zone::Defensive) => push(StatKind::WonDefensiveZoneFaceoff, d.winning_player_id, owner),
                _ => {}
            }
        }
        PlayKind::Hit(d) => {
            push(StatKind::Hit, d.hitting_player_id, Some(d.event_owner_team_id));
            push(StatKind::Hittee, d.hittee_player_id, pbp.opponent_of(d.event_owner_team_id));
        }
        PlayKind::Stoppage(d) => {
            let stat = match d.reason.as_str() {
                "offside" => Some(StatKind::Offside),
                "icing" => Some(StatKind::Icing),
                reason if PUCK_OUT_OF_PLAY.contains(&reason) => Some(StatKind::PuckOutOfPlay),
                _ => None,
            };
            if let Some(stat) = stat {
                push(stat, None, None);
            }
        }
        PlayKind::BlockedShot(d) => {
            let owner = Some(d.event_owner_team_id);
            push(StatKind::BlockedShot, d.blocking_player_id, owner);
            push(StatKind::ShotBlocked, d.shooting_player_id, pbp.opponent_of(d.event_owner_team_id));
            if strength_of(d.event_owner_team_id, play, pbp) == Strength::ShortHanded {
                push(StatKind::PkBlock, d.blocking_player_id, owner);
            }
        }
        PlayKind::Penalty(d) => {
            let owner = Some(d.event_owner_team_id);
            push(StatKind::Penalty, d.committed_by_player_id, owner);
            push(StatKind::PenaltyDrawn, d.drawn_by_player_id, pbp.opponent_of(d.event_owner_team_id));
            if STICK_INFRACTIONS.contains(&d.desc_key.as_str()) {
                push(StatKind::StickInfraction, d.committed_by_player_id, owner);
            }
            if d.duration >= MAJOR_PENALTY_MINUTES {
                push(StatKind::MajorPenalty, d.committed_by_player_id, owner);
            }
            // Minutes only count against the player who took the penalty
            if let Some(player_id) = d.committed_by_player_id {
                credits.push(StatCredit {
                    stat: StatKind::Pim,
                    player_id: Some(player_id),
                    team_id: None,
                    amount: d.duration as f64,
                });
            }
        }
        PlayKind::Giveaway(d) => {
            let owner = Some(d.event_owner_team_id);
            push(StatKind::Giveaway, d.player_id, owner);
            match d.zone_code {
                Some(Zone::Defensive) => push(StatKind::DefensiveZoneGiveaway, d.player_id, owner),
                Some(Zone::Offensive) => push(StatKind::OffensiveZoneGiveaway, d.player_id, owner),
                _ => {}
            }
        }
        PlayKind::Takeaway(d) => {
            let owner = Some(d.event_owner_team_id);
            push(StatKind::Takeaway, d.player_id, owner);
            match d.zone_code {
                Some(Zone::Defensive) => push(StatKind::DefensiveZoneTakeaway, d.player_id, owner),
                Some(Zone::Offensive) => push(StatKind::OffensiveZoneTakeaway, d.player_id, owner),
                _ => {}
            }
        }
        PlayKind::ShotOnGoal(d) => {
            let owner = Some(d.event_owner_team_id);
            push(StatKind::ShotOnGoal, d.shooting_player_id, owner);
            if d.zone_code == Some(Zone::Defensive) {
                push(StatKind::ShotFromDefensiveZone, d.shooting_player_id, owner);
            }
            if let Some(stat) = d.shot_type.as_deref().and_then(shot_type_stat) {
                push(stat, d.shooting_player_id, owner);
            }
        }
        PlayKind::Goal(d) => {
            let owner = Some(d.event_owner_team_id);
            push(StatKind::Goal, d.scoring_player_id, owner);
            for player_id in [d.scoring_player_id, d.assist1_player_id, d.assist2_player_id]
                .into_iter()
                .flatten()
            {
                push(StatKind::Point, Some(player_id), None);
            }
            match strength_of(d.event_owner_team_id, play, pbp) {
                Strength::PowerPlay => push(StatKind::PowerPlayGoal, d.scoring_player_id, owner),
                Strength::ShortHanded => push(StatKind::ShortHandedGoal, d.scoring_player_id, owner),
                Strength::Even => {}
            }
        }
        PlayKind::MissedShot(d) => {
            if d.reason.as_deref().is_some_and(|r| POST_REASONS.contains(&r)) {
                push(StatKind::Post, d.shooting_player_id, Some(d.event_owner_team_id));
            }
        }
        PlayKind::Other(_) => {}
    }

    credits
}

/// Result of folding one play-by-play snapshot into an event's squares
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Squares whose counter moved, with their new values
    pub changed: Vec<ResolvedSquare>,
    pub cursor: GameClock,
    pub plays_processed: usize,
}

impl Evaluation {
    pub fn changed_ids(&self) -> Vec<Uuid> {
        self.changed.iter().map(|s| s.id).collect()
    }
}

/// Applies every play strictly after `cursor` to the unresolved squares.
/// Squares that were already resolved are never touched.
pub fn evaluate(squares: &[ResolvedSquare], pbp: &PlayByPlay, cursor: GameClock) -> Evaluation {
    let mut working: Vec<ResolvedSquare> = squares
        .iter()
        .filter(|s| !s.has_occurred())
        .cloned()
        .collect();
    let before: Vec<f64> = working.iter().map(|s| s.current_value()).collect();

    let mut new_cursor = cursor;
    let mut plays_processed = 0;
    for play in pbp.plays.iter().filter(|p| p.clock > cursor) {
        plays_processed += 1;
        new_cursor = new_cursor.max(play.clock);
        for credit in credits_for(play, pbp) {
            for square in working.iter_mut().filter(|s| credit.matches(s)) {
                square.record(credit.amount);
            }
        }
    }

    let changed = working
        .into_iter()
        .zip(before)
        .filter(|(square, old)| square.current_value() != *old)
        .map(|(square, _)| square)
        .collect();

    Evaluation { changed, cursor: new_cursor, plays_processed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::RinkSide;
    use crate::models::play::{
        FaceoffDetails, GoalDetails, HitDetails, PenaltyDetails, ShotDetails, StoppageDetails,
    };
    use crate::models::sport_event::TeamInfo;

    const TOR: i64 = 10;
    const BOS: i64 = 6;

    fn pbp(plays: Vec<Play>) -> PlayByPlay {
        PlayByPlay {
            home_team: TeamInfo { id: TOR, name: "Maple Leafs".into(), abbrev: "TOR".into() },
            away_team: TeamInfo { id: BOS, name: "Bruins".into(), abbrev: "BOS".into() },
            plays,
        }
    }

    fn at(period: i32, time: &str, kind: PlayKind) -> Play {
        Play {
            event_id: 0,
            clock: GameClock::parse(period, time).unwrap(),
            situation_code: "1551".to_string(),
            home_team_defending_side: Some(RinkSide::Left),
            kind,
        }
    }

    fn square(stat: StatKind, subject: SquareSubject, target: f64) -> ResolvedSquare {
        ResolvedSquare::new(Uuid::new_v4(), None, Uuid::from_u128(1), stat, subject, target, 0.0, "")
    }

    fn hit(owner: i64, hitter: i64, hittee: i64) -> PlayKind {
        PlayKind::Hit(HitDetails {
            event_owner_team_id: owner,
            hitting_player_id: Some(hitter),
            hittee_player_id: Some(hittee),
            zone_code: None,
        })
    }

    fn penalty(owner: i64, committed: i64, duration: i32, desc_key: &str) -> PlayKind {
        PlayKind::Penalty(PenaltyDetails {
            event_owner_team_id: owner,
            committed_by_player_id: Some(committed),
            drawn_by_player_id: Some(8_480_001),
            desc_key: desc_key.to_string(),
            duration,
            zone_code: None,
        })
    }

    fn value_of(eval: &Evaluation, id: Uuid) -> f64 {
        eval.changed.iter().find(|s| s.id == id).map(|s| s.current_value()).unwrap_or(0.0)
    }

    #[test]
    fn four_team_hits_clear_a_three_and_a_half_target() {
        // Team hit template 2..=5 drew 3
        let leafs_hits = square(StatKind::Hit, SquareSubject::Team { team_id: TOR }, 3.0 + 0.5);
        let plays = (0..4)
            .map(|i| at(1, &format!("1{}:00", 5 - i), hit(TOR, 8_470_000 + i, 8_480_000)))
            .collect();

        let eval = evaluate(&[leafs_hits.clone()], &pbp(plays), GameClock::before_start());

        assert_eq!(eval.changed.len(), 1);
        assert_eq!(eval.changed[0].current_value(), 4.0);
        assert!(eval.changed[0].has_occurred());
        assert_eq!(eval.plays_processed, 4);
    }

    #[test]
    fn major_penalty_counts_minutes_and_penalties() {
        let player = 8_470_010;
        let subject = SquareSubject::Player { player_id: player, team_id: TOR };
        let pim = square(StatKind::Pim, subject, 10.5);
        let major = square(StatKind::MajorPenalty, subject, 2.5);
        let any_penalty = square(StatKind::Penalty, subject, 2.5);

        let plays = vec![at(2, "12:00", penalty(TOR, player, 5, "fighting"))];
        let eval = evaluate(
            &[pim.clone(), major.clone(), any_penalty.clone()],
            &pbp(plays),
            GameClock::before_start(),
        );

        assert_eq!(value_of(&eval, pim.id), 5.0);
        assert_eq!(value_of(&eval, major.id), 1.0);
        assert_eq!(value_of(&eval, any_penalty.id), 1.0);
    }

    #[test]
    fn only_plays_after_the_cursor_count() {
        let team_hits = square(StatKind::Hit, SquareSubject::Team { team_id: TOR }, 5.5);
        let plays = vec![
            at(2, "09:45", hit(TOR, 1, 2)),
            at(2, "15:00", hit(TOR, 1, 2)),
        ];
        let cursor = GameClock::parse(2, "10:00").unwrap();

        let eval = evaluate(&[team_hits], &pbp(plays), cursor);

        assert_eq!(eval.plays_processed, 1);
        assert_eq!(eval.changed[0].current_value(), 1.0);
        assert_eq!(eval.cursor, GameClock::parse(2, "09:45").unwrap());
    }

    #[test]
    fn empty_batch_keeps_the_cursor() {
        let cursor = GameClock::parse(3, "01:00").unwrap();
        let plays = vec![at(1, "05:00", hit(TOR, 1, 2))];
        let eval = evaluate(&[], &pbp(plays), cursor);
        assert_eq!(eval.cursor, cursor);
        assert_eq!(eval.plays_processed, 0);
        assert!(eval.changed.is_empty());
    }

    #[test]
    fn replaying_the_same_snapshot_changes_nothing() {
        let team_hits = square(StatKind::Hit, SquareSubject::Team { team_id: BOS }, 5.5);
        let snapshot = pbp(vec![at(1, "19:00", hit(BOS, 1, 2)), at(1, "18:00", hit(BOS, 1, 2))]);

        let first = evaluate(&[team_hits], &snapshot, GameClock::before_start());
        let second = evaluate(&first.changed, &snapshot, first.cursor);

        assert_eq!(first.changed[0].current_value(), 2.0);
        assert!(second.changed.is_empty());
        assert_eq!(second.cursor, first.cursor);
    }

    #[test]
    fn hittee_credits_the_team_that_was_hit() {
        let bos_hittee = square(StatKind::Hittee, SquareSubject::Team { team_id: BOS }, 0.5);
        let tor_hittee = square(StatKind::Hittee, SquareSubject::Team { team_id: TOR }, 0.5);
        let victim = square(
            StatKind::Hittee,
            SquareSubject::Player { player_id: 8_480_000, team_id: BOS },
            0.5,
        );
        let eval = evaluate(
            &[bos_hittee.clone(), tor_hittee.clone(), victim.clone()],
            &pbp(vec![at(1, "10:00", hit(TOR, 8_470_000, 8_480_000))]),
            GameClock::before_start(),
        );
        assert_eq!(value_of(&eval, bos_hittee.id), 1.0);
        assert_eq!(value_of(&eval, tor_hittee.id), 0.0);
        assert_eq!(value_of(&eval, victim.id), 1.0);
    }

    #[test]
    fn stoppages_count_for_every_square_of_the_stat() {
        let game_icing = square(StatKind::Icing, SquareSubject::GameWide, 1.5);
        let team_icing = square(StatKind::Icing, SquareSubject::Team { team_id: TOR }, 1.5);
        let offside = square(StatKind::Offside, SquareSubject::GameWide, 1.5);
        let stoppage = |reason: &str| PlayKind::Stoppage(StoppageDetails { reason: reason.into() });
        let plays = vec![at(1, "12:00", stoppage("icing")), at(1, "11:00", stoppage("puck-in-crowd"))];

        let eval = evaluate(
            &[game_icing.clone(), team_icing.clone(), offside.clone()],
            &pbp(plays),
            GameClock::before_start(),
        );
        assert_eq!(value_of(&eval, game_icing.id), 1.0);
        assert_eq!(value_of(&eval, team_icing.id), 1.0);
        assert_eq!(value_of(&eval, offside.id), 0.0);
    }

    #[test]
    fn power_play_goal_credits_scorer_and_team() {
        let scorer = 8_470_002;
        let goal = PlayKind::Goal(GoalDetails {
            event_owner_team_id: TOR,
            scoring_player_id: Some(scorer),
            assist1_player_id: Some(8_470_003),
            assist2_player_id: None,
            shot_type: Some("wrist".into()),
            zone_code: Some(Zone::Offensive),
        });
        // Home defends the left end with five skaters against four
        let mut play = at(2, "04:00", goal);
        play.situation_code = "1541".to_string();

        let team_ppg = square(StatKind::PowerPlayGoal, SquareSubject::Team { team_id: TOR }, 0.5);
        let scorer_ppg = square(
            StatKind::PowerPlayGoal,
            SquareSubject::Player { player_id: scorer, team_id: TOR },
            0.5,
        );
        let bos_shg = square(StatKind::ShortHandedGoal, SquareSubject::Team { team_id: BOS }, 0.5);
        let assist_point = square(
            StatKind::Point,
            SquareSubject::Player { player_id: 8_470_003, team_id: TOR },
            0.5,
        );
        let team_point = square(StatKind::Point, SquareSubject::Team { team_id: TOR }, 0.5);

        let eval = evaluate(
            &[team_ppg.clone(), scorer_ppg.clone(), bos_shg.clone(), assist_point.clone(), team_point.clone()],
            &pbp(vec![play]),
            GameClock::before_start(),
        );
        assert_eq!(value_of(&eval, team_ppg.id), 1.0);
        assert_eq!(value_of(&eval, scorer_ppg.id), 1.0);
        assert_eq!(value_of(&eval, bos_shg.id), 0.0);
        assert_eq!(value_of(&eval, assist_point.id), 1.0);
        assert_eq!(value_of(&eval, team_point.id), 0.0);
    }

    #[test]
    fn zone_and_shot_type_variants() {
        let faceoff = PlayKind::Faceoff(FaceoffDetails {
            event_owner_team_id: BOS,
            winning_player_id: Some(8_480_005),
            losing_player_id: Some(8_470_005),
            zone_code: Some(Zone::Defensive),
        });
        let shot = PlayKind::ShotOnGoal(ShotDetails {
            event_owner_team_id: TOR,
            shooting_player_id: Some(8_470_001),
            shot_type: Some("tip-in".into()),
            zone_code: Some(Zone::Offensive),
        });
        let credits = credits_for(&at(1, "10:00", faceoff), &pbp(vec![]));
        let stats: Vec<StatKind> = credits.iter().map(|c| c.stat).collect();
        assert_eq!(stats, vec![StatKind::WonFaceoff, StatKind::WonDefensiveZoneFaceoff]);

        let credits = credits_for(&at(1, "09:00", shot), &pbp(vec![]));
        let stats: Vec<StatKind> = credits.iter().map(|c| c.stat).collect();
        assert_eq!(stats, vec![StatKind::ShotOnGoal, StatKind::ShotTip]);
    }

    #[test]
    fn stick_infractions_are_recognised_by_description() {
        let credits = credits_for(&at(1, "10:00", penalty(BOS, 1, 2, "high-sticking")), &pbp(vec![]));
        assert!(credits.iter().any(|c| c.stat == StatKind::StickInfraction));
        assert!(!credits.iter().any(|c| c.stat == StatKind::MajorPenalty));
        let drawn = credits.iter().find(|c| c.stat == StatKind::PenaltyDrawn).unwrap();
        assert_eq!(drawn.team_id, Some(TOR));
    }

    #[test]
    fn resolved_squares_are_left_alone() {
        let mut done = square(StatKind::Hit, SquareSubject::Team { team_id: TOR }, 0.5);
        done.record(1.0);
        let eval = evaluate(
            &[done],
            &pbp(vec![at(1, "10:00", hit(TOR, 1, 2))]),
            GameClock::before_start(),
        );
        assert!(eval.changed.is_empty());
        assert_eq!(eval.plays_processed, 1);
    }
}
