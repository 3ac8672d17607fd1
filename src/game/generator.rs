use std::cmp::Ordering;

use uuid::Uuid;

use crate::error::{BingoError, BingoResult};
use crate::game::rand::BingoRng;
use crate::models::board::{GameCategory, BOARD_SIZE};
use crate::models::common::TeamSide;
use crate::models::sport_event::{GameRoster, RosterPlayer};
use crate::models::square::{ResolvedSquare, SquareSubject, SquareTemplate, StatKind, SubjectType};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 250;

#[derive(Debug, Clone, Copy)]
pub struct GeneratorSettings {
    /// Draws allowed per slot before giving up
    pub max_attempts: u32,
    /// Draw players from the top half of the season leaders for the stat
    pub favor_stat_leaders: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            favor_stat_leaders: false,
        }
    }
}

/// A sport event squares can be bound to, with its roster snapshot
#[derive(Debug, Clone)]
pub struct EventContext {
    pub sport_event_id: Uuid,
    pub roster: GameRoster,
}

/// Templates available for one column of the board
#[derive(Debug, Clone)]
pub struct CategoryTemplates {
    pub category: GameCategory,
    pub templates: Vec<SquareTemplate>,
}

/// A square drawn but not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct SquareDraft {
    pub template_id: Uuid,
    pub sport_event_id: Uuid,
    pub stat: StatKind,
    pub subject: SquareSubject,
    pub target_value: f64,
    pub description: String,
}

impl SquareDraft {
    pub fn into_square(self, id: Uuid) -> ResolvedSquare {
        ResolvedSquare::new(
            id,
            Some(self.template_id),
            self.sport_event_id,
            self.stat,
            self.subject,
            self.target_value,
            0.0,
            self.description,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftSlot {
    pub category_id: Uuid,
    pub square_index: usize,
    pub draft: SquareDraft,
}

/// What a board slot already holds, as far as duplication is concerned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occupant {
    pub subject: SquareSubject,
    pub stat: StatKind,
}

impl From<&SquareDraft> for Occupant {
    fn from(draft: &SquareDraft) -> Self {
        Self { subject: draft.subject, stat: draft.stat }
    }
}

impl From<&ResolvedSquare> for Occupant {
    fn from(square: &ResolvedSquare) -> Self {
        Self { subject: square.subject, stat: square.stat }
    }
}

/// A player may appear once per board. Squares without a player may not
/// repeat a `(team, stat)` pair of another square without a player.
pub fn collides(candidate: Occupant, taken: &[Occupant]) -> bool {
    match candidate.subject.player_id() {
        Some(player_id) => taken
            .iter()
            .any(|t| t.subject.player_id() == Some(player_id)),
        None => taken.iter().any(|t| {
            t.subject.player_id().is_none()
                && t.subject.team_id() == candidate.subject.team_id()
                && t.stat == candidate.stat
        }),
    }
}

/// Fills `display_format` placeholders. A placeholder whose subject did not
/// resolve is left as written.
pub fn describe(
    display_format: &str,
    player: Option<&RosterPlayer>,
    team_name: Option<&str>,
    matchup: &str,
    stat: StatKind,
    target_value: f64,
) -> String {
    let mut description = display_format.to_string();
    if let Some(player) = player {
        description = description.replace("{player}", &player.name);
    }
    if let Some(team_name) = team_name {
        description = description.replace("{team}", team_name);
    }
    description
        .replace("{game}", matchup)
        .replace("{stat}", stat.as_str())
        .replace("{value}", &target_value.to_string())
}

pub struct SquareGenerator<'a> {
    rng: BingoRng,
    events: &'a [EventContext],
    settings: GeneratorSettings,
}

impl<'a> SquareGenerator<'a> {
    pub fn new(rng: BingoRng, events: &'a [EventContext], settings: GeneratorSettings) -> Self {
        Self { rng, events, settings }
    }

    /// Draws all 25 squares, column by column in category index order
    pub fn generate_board(&mut self, columns: &[CategoryTemplates]) -> BingoResult<Vec<DraftSlot>> {
        let mut ordered: Vec<&CategoryTemplates> = columns.iter().collect();
        ordered.sort_by_key(|c| c.category.category_index);

        let mut slots = Vec::with_capacity(BOARD_SIZE * BOARD_SIZE);
        let mut taken: Vec<Occupant> = Vec::with_capacity(BOARD_SIZE * BOARD_SIZE);
        for column in ordered {
            for square_index in 0..BOARD_SIZE {
                let draft = self.draw_square(column.category.category_id, &column.templates, &taken)?;
                taken.push(Occupant::from(&draft));
                slots.push(DraftSlot {
                    category_id: column.category.category_id,
                    square_index,
                    draft,
                });
            }
        }

        tracing::debug!(
            "Drafted {} squares with seed {}",
            slots.len(),
            self.rng.fingerprint()
        );
        Ok(slots)
    }

    /// Draws one square that does not collide with `taken`
    pub fn draw_square(
        &mut self,
        category_id: Uuid,
        templates: &[SquareTemplate],
        taken: &[Occupant],
    ) -> BingoResult<SquareDraft> {
        if self.events.is_empty() {
            return Err(BingoError::InvalidData(
                "no sport events to draw squares from".to_string(),
            ));
        }

        for _ in 0..self.settings.max_attempts {
            let Some(draft) = self.try_draw(templates) else {
                continue;
            };
            if !collides(Occupant::from(&draft), taken) {
                return Ok(draft);
            }
        }

        tracing::warn!(
            "Category {} exhausted after {} attempts ({} templates, {} squares taken)",
            category_id,
            self.settings.max_attempts,
            templates.len(),
            taken.len()
        );
        Err(BingoError::CatalogExhausted {
            category_id,
            attempts: self.settings.max_attempts,
        })
    }

    /// One draw; `None` when the drawn team has nobody able to fill the subject
    fn try_draw(&mut self, templates: &[SquareTemplate]) -> Option<SquareDraft> {
        let template = self.rng.pick(templates)?;
        let event = self.rng.pick(self.events)?;
        let roster = &event.roster;

        let (subject, player, team_name) = match template.subject_type {
            SubjectType::GameWide => (SquareSubject::GameWide, None, None),
            subject_type => {
                let side = if self.rng.random() > 0.5 { TeamSide::Home } else { TeamSide::Away };
                let team = roster.team(side);
                if subject_type == SubjectType::Team {
                    (SquareSubject::Team { team_id: team.id }, None, Some(team.name.as_str()))
                } else {
                    let candidates = self.candidates(roster, team.id, subject_type, template.stat);
                    let player = *self.rng.pick(&candidates)?;
                    (
                        SquareSubject::Player {
                            player_id: player.player_id,
                            team_id: team.id,
                        },
                        Some(player),
                        Some(team.name.as_str()),
                    )
                }
            }
        };

        let target_value = self.rng.int_between(template.range_min, template.range_max) as f64 + 0.5;
        let description = describe(
            &template.display_format,
            player,
            team_name,
            &roster.matchup(),
            template.stat,
            target_value,
        );

        Some(SquareDraft {
            template_id: template.id,
            sport_event_id: event.sport_event_id,
            stat: template.stat,
            subject,
            target_value,
            description,
        })
    }

    fn candidates<'r>(
        &self,
        roster: &'r GameRoster,
        team_id: i64,
        subject_type: SubjectType,
        stat: StatKind,
    ) -> Vec<&'r RosterPlayer> {
        let mut players = roster.eligible_players(team_id, subject_type);
        if self.settings.favor_stat_leaders && !players.is_empty() {
            players.sort_by(|a, b| {
                b.ranking_for(stat)
                    .partial_cmp(&a.ranking_for(stat))
                    .unwrap_or(Ordering::Equal)
            });
            let keep = players.len().div_ceil(2).max(1);
            players.truncate(keep);
        }
        players
    }
}
