//! Built-in square catalog seeded into fresh installs.

use uuid::Uuid;

use crate::error::BingoResult;
use crate::game::bingo::standard_lines;
use crate::models::board::{Category, BOARD_SIZE};
use crate::models::pattern::{BingoPattern, PatternLine};
use crate::models::square::{SquareTemplate, StatKind, SubjectType};

use SubjectType::{Defense as D, Forward as F, GameWide as Game, Team};

const CATALOG_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_2b0e_8a44_4f3b_9d1e_5a7c_0b2d_4e61);

const CATEGORIES: [(&str, &str); 9] = [
    ("Grit", "Physical play and winning the dirty battles"),
    ("200 Foot Game", "Contributions at both ends of the rink"),
    ("Getting Pucks Deep", "Pucks on net from everywhere"),
    ("Battle in the Trenches", "Hits given and taken"),
    ("Hockey IQ", "Reading the play and managing the puck"),
    ("Heart and Hustle", "Shooting volume and effort"),
    ("Net-front Presence", "Goals and tips from in tight"),
    ("Cycle Game", "Sustained offensive zone pressure"),
    ("Clutch Performances", "Finishing when it counts"),
];

type TemplateRow = (&'static str, SubjectType, StatKind, i32, i32);

#[rustfmt::skip]
const TEMPLATES: &[TemplateRow] = &[
    ("Grit", D, StatKind::Hit, 2, 5),
    ("Grit", F, StatKind::WonOffensiveZoneFaceoff, 2, 5),
    ("Grit", Team, StatKind::PenaltyDrawn, 2, 4),
    ("Grit", Team, StatKind::Hittee, 10, 17),
    ("Grit", Team, StatKind::DefensiveZoneTakeaway, 5, 8),
    ("Grit", F, StatKind::Pim, 2, 4),
    ("Grit", Team, StatKind::MajorPenalty, 0, 0),
    ("200 Foot Game", D, StatKind::ShotBlocked, 2, 5),
    ("200 Foot Game", F, StatKind::ShotOnGoal, 2, 6),
    ("200 Foot Game", Team, StatKind::ShotFromDefensiveZone, 2, 3),
    ("200 Foot Game", Team, StatKind::WonDefensiveZoneFaceoff, 15, 20),
    ("200 Foot Game", Team, StatKind::WonOffensiveZoneFaceoff, 15, 20),
    ("200 Foot Game", Team, StatKind::OffensiveZoneTakeaway, 5, 8),
    ("200 Foot Game", D, StatKind::BlockedShot, 2, 4),
    ("200 Foot Game", Team, StatKind::PkBlock, 2, 5),
    ("Getting Pucks Deep", F, StatKind::ShotOnGoal, 2, 6),
    ("Getting Pucks Deep", F, StatKind::ShotSlap, 1, 2),
    ("Getting Pucks Deep", F, StatKind::ShotTip, 1, 2),
    ("Getting Pucks Deep", F, StatKind::ShotWrist, 1, 2),
    ("Getting Pucks Deep", F, StatKind::ShotBackhand, 1, 2),
    ("Getting Pucks Deep", Team, StatKind::ShotFromDefensiveZone, 2, 3),
    ("Getting Pucks Deep", Team, StatKind::ShotOnGoal, 15, 20),
    ("Getting Pucks Deep", Game, StatKind::PuckOutOfPlay, 3, 6),
    ("Battle in the Trenches", F, StatKind::Hit, 2, 5),
    ("Battle in the Trenches", D, StatKind::Hit, 2, 5),
    ("Battle in the Trenches", Team, StatKind::Hittee, 10, 17),
    ("Battle in the Trenches", Team, StatKind::PenaltyDrawn, 2, 4),
    ("Battle in the Trenches", Team, StatKind::Hit, 10, 17),
    ("Battle in the Trenches", Team, StatKind::StickInfraction, 1, 3),
    ("Battle in the Trenches", F, StatKind::Penalty, 0, 1),
    ("Hockey IQ", F, StatKind::Takeaway, 2, 5),
    ("Hockey IQ", D, StatKind::Takeaway, 2, 5),
    ("Hockey IQ", Team, StatKind::Takeaway, 5, 8),
    ("Hockey IQ", F, StatKind::Giveaway, 2, 5),
    ("Hockey IQ", D, StatKind::Giveaway, 2, 5),
    ("Hockey IQ", Team, StatKind::Giveaway, 5, 8),
    ("Hockey IQ", Game, StatKind::Icing, 4, 8),
    ("Hockey IQ", Game, StatKind::Offside, 3, 6),
    ("Heart and Hustle", F, StatKind::ShotOnGoal, 2, 6),
    ("Heart and Hustle", F, StatKind::ShotSlap, 1, 2),
    ("Heart and Hustle", F, StatKind::ShotTip, 1, 2),
    ("Heart and Hustle", F, StatKind::ShotWrist, 1, 2),
    ("Heart and Hustle", F, StatKind::ShotBackhand, 1, 2),
    ("Heart and Hustle", Team, StatKind::ShotFromDefensiveZone, 2, 3),
    ("Heart and Hustle", Team, StatKind::ShotOnGoal, 15, 20),
    ("Heart and Hustle", Team, StatKind::DefensiveZoneGiveaway, 2, 4),
    ("Net-front Presence", F, StatKind::Goal, 1, 2),
    ("Net-front Presence", F, StatKind::ShotTip, 1, 2),
    ("Net-front Presence", F, StatKind::ShotSlap, 1, 2),
    ("Net-front Presence", F, StatKind::ShotWrist, 1, 2),
    ("Net-front Presence", F, StatKind::ShotBackhand, 1, 2),
    ("Net-front Presence", Team, StatKind::Goal, 2, 4),
    ("Net-front Presence", Team, StatKind::ShotTip, 2, 4),
    ("Net-front Presence", Team, StatKind::ShotSlap, 2, 4),
    ("Net-front Presence", Team, StatKind::ShotWrist, 2, 4),
    ("Net-front Presence", Team, StatKind::ShotBackhand, 2, 4),
    ("Net-front Presence", Team, StatKind::Post, 0, 2),
    ("Cycle Game", F, StatKind::ShotOnGoal, 2, 6),
    ("Cycle Game", F, StatKind::ShotSlap, 1, 2),
    ("Cycle Game", F, StatKind::ShotTip, 1, 2),
    ("Cycle Game", F, StatKind::ShotWrist, 1, 2),
    ("Cycle Game", F, StatKind::ShotBackhand, 1, 2),
    ("Cycle Game", Team, StatKind::ShotFromDefensiveZone, 2, 3),
    ("Cycle Game", Team, StatKind::ShotOnGoal, 20, 30),
    ("Cycle Game", Team, StatKind::OffensiveZoneGiveaway, 2, 4),
    ("Clutch Performances", F, StatKind::Goal, 0, 0),
    ("Clutch Performances", F, StatKind::Point, 1, 2),
    ("Clutch Performances", F, StatKind::ShotTip, 1, 2),
    ("Clutch Performances", F, StatKind::ShotSlap, 1, 2),
    ("Clutch Performances", F, StatKind::ShotWrist, 1, 2),
    ("Clutch Performances", F, StatKind::ShotBackhand, 1, 2),
    ("Clutch Performances", Team, StatKind::Goal, 2, 4),
    ("Clutch Performances", Team, StatKind::PowerPlayGoal, 0, 1),
    ("Clutch Performances", Team, StatKind::ShortHandedGoal, 0, 0),
    ("Clutch Performances", D, StatKind::Point, 0, 1),
];

#[derive(Debug, Clone)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub templates: Vec<SquareTemplate>,
    /// Catalog order; earlier patterns are awarded first
    pub patterns: Vec<BingoPattern>,
}

impl Catalog {
    pub fn templates_for(&self, category_id: Uuid) -> Vec<SquareTemplate> {
        self.templates
            .iter()
            .filter(|t| t.category_id == category_id)
            .cloned()
            .collect()
    }

    pub fn category_named(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// Stable id for a catalog category, so reseeding upserts instead of duplicating
pub fn category_id(name: &str) -> Uuid {
    Uuid::new_v5(&CATALOG_NAMESPACE, format!("category:{}", name).as_bytes())
}

fn template_id(category: &str, subject: SubjectType, stat: StatKind, min: i32, max: i32) -> Uuid {
    let key = format!("template:{}:{}:{}:{}:{}", category, subject.as_str(), stat, min, max);
    Uuid::new_v5(&CATALOG_NAMESPACE, key.as_bytes())
}

fn pattern(name: &str, description: &str, lines: Vec<PatternLine>) -> BingoPattern {
    BingoPattern {
        id: Uuid::new_v5(&CATALOG_NAMESPACE, format!("pattern:{}", name).as_bytes()),
        name: name.to_string(),
        description: description.to_string(),
        lines,
    }
}

fn default_patterns() -> BingoResult<Vec<BingoPattern>> {
    let last = BOARD_SIZE - 1;
    let corners = PatternLine::from_pairs(&[(0, 0), (0, last), (last, 0), (last, last)])?;
    let mut cross: Vec<(usize, usize)> = (0..BOARD_SIZE)
        .flat_map(|i| [(i, i), (i, last - i)])
        .collect();
    cross.sort();
    cross.dedup();
    let blackout: Vec<(usize, usize)> = (0..BOARD_SIZE)
        .flat_map(|x| (0..BOARD_SIZE).map(move |y| (x, y)))
        .collect();

    Ok(vec![
        pattern("Line", "Any full row, column or diagonal", standard_lines()?),
        pattern("Four Corners", "All four corner squares", vec![corners]),
        pattern("X", "Both diagonals", vec![PatternLine::from_pairs(&cross)?]),
        pattern("Blackout", "Every square on the board", vec![PatternLine::from_pairs(&blackout)?]),
    ])
}

pub fn display_format(subject: SubjectType, stat: StatKind) -> String {
    let placeholder = match subject {
        SubjectType::GameWide => "{game}",
        SubjectType::Team => "{team}",
        SubjectType::Forward | SubjectType::Defense | SubjectType::Goalie => "{player}",
    };
    format!("{} over {{value}} {}", placeholder, stat.friendly_name())
}

pub fn template_description(subject: SubjectType, stat: StatKind) -> String {
    let phrase = match subject {
        SubjectType::GameWide => "the game",
        SubjectType::Team => "the team",
        SubjectType::Forward => "a forward",
        SubjectType::Defense => "a defenseman",
        SubjectType::Goalie => "a goalie",
    };
    format!("{} by {}", stat.friendly_name(), phrase)
}

pub fn default_catalog() -> BingoResult<Catalog> {
    let categories = CATEGORIES
        .iter()
        .map(|(name, description)| Category {
            id: category_id(name),
            name: name.to_string(),
            description: Some(description.to_string()),
        })
        .collect();

    let mut templates: Vec<SquareTemplate> = Vec::with_capacity(TEMPLATES.len());
    for &(category, subject, stat, min, max) in TEMPLATES {
        let id = template_id(category, subject, stat, min, max);
        if templates.iter().any(|t| t.id == id) {
            continue;
        }
        templates.push(SquareTemplate::new(
            id,
            category_id(category),
            subject,
            stat,
            min,
            max,
            display_format(subject, stat),
            template_description(subject, stat),
        )?);
    }

    Ok(Catalog {
        categories,
        templates,
        patterns: default_patterns()?,
    })
}
