use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::store::BingoStore;
use crate::error::{BingoError, BingoResult};
use crate::models::play::GameClock;
use crate::models::sport_event::{ScheduledGame, SportEvent};
use crate::services::nhl_client::SportsDataSource;

pub struct SportEventService {
    store: Arc<dyn BingoStore>,
    data_source: Arc<dyn SportsDataSource>,
}

impl SportEventService {
    pub fn new(store: Arc<dyn BingoStore>, data_source: Arc<dyn SportsDataSource>) -> Self {
        Self { store, data_source }
    }

    /// Returns the sport event for an external game, creating it from the
    /// game's landing page the first time it is seen
    #[tracing::instrument(name = "Register sport event", skip(self))]
    pub async fn register_sport_event(&self, api_identifier: &str) -> BingoResult<SportEvent> {
        let api_identifier = api_identifier.trim();
        if api_identifier.is_empty() {
            return Err(BingoError::InvalidData("api_identifier must not be empty".to_string()));
        }

        if let Some(existing) = self.store.find_sport_event_by_api_id(api_identifier).await? {
            return Ok(existing);
        }

        let roster = self.data_source.get_roster(api_identifier).await?;
        let start_time = roster.start_time.unwrap_or_else(|| {
            warn!("Game {} has no start time, using now", api_identifier);
            Utc::now()
        });
        let event = SportEvent {
            id: Uuid::new_v4(),
            api_identifier: api_identifier.to_string(),
            home_team: roster.home_team.name,
            away_team: roster.away_team.name,
            start_time,
            cursor: GameClock::before_start(),
        };

        let stored = self.store.insert_sport_event(&event).await?;
        info!(
            "Registered sport event {} ({} vs {}) starting {}",
            stored.api_identifier, stored.away_team, stored.home_team, stored.start_time
        );
        Ok(stored)
    }

    /// Registered events starting from four hours before `day` until the end
    /// of it; around now when no day is given
    pub async fn list_sport_events(&self, day: Option<NaiveDate>) -> BingoResult<Vec<SportEvent>> {
        let anchor = day.map(start_of_day).unwrap_or_else(Utc::now);
        self.store
            .list_sport_events_between(anchor - Duration::hours(4), anchor + Duration::days(1))
            .await
    }

    /// NHL games on the schedule for `day` (today when omitted) that could be registered
    #[tracing::instrument(name = "Possible sport events", skip(self))]
    pub async fn possible_sport_events(&self, day: Option<NaiveDate>) -> BingoResult<Vec<ScheduledGame>> {
        let day = day.unwrap_or_else(|| Utc::now().date_naive());
        self.data_source.get_schedule(day).await
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::default()).and_utc()
}
