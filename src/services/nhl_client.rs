use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{BingoError, BingoResult};
use crate::models::nhl::{LandingResponse, PlayByPlayResponse, ScoreboardResponse};
use crate::models::sport_event::{GameRoster, PlayByPlay, ScheduledGame};

/// Live data for external games, keyed by their API identifier
#[async_trait]
pub trait SportsDataSource: Send + Sync {
    async fn get_play_by_play(&self, api_identifier: &str) -> BingoResult<PlayByPlay>;

    async fn get_roster(&self, api_identifier: &str) -> BingoResult<GameRoster>;

    /// Games scheduled on one day
    async fn get_schedule(&self, date: NaiveDate) -> BingoResult<Vec<ScheduledGame>>;
}

pub struct NhlApiClient {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl NhlApiClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: Client::new(),
        }
    }

    /// `source` names what is fetched in upstream errors
    async fn fetch<T: DeserializeOwned>(&self, source: &str, path: &str) -> BingoResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("🏒 Calling NHL API at {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| BingoError::upstream(source, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("❌ NHL API returned error {} for {}: {}", status, url, error_text);
            return Err(BingoError::upstream(
                source,
                format!("{} - {}", status, error_text),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BingoError::upstream(source, format!("unreadable {}: {}", path, e)))
    }
}

#[async_trait]
impl SportsDataSource for NhlApiClient {
    async fn get_play_by_play(&self, api_identifier: &str) -> BingoResult<PlayByPlay> {
        let path = format!("gamecenter/{}/play-by-play", api_identifier);
        let response: PlayByPlayResponse = self.fetch(api_identifier, &path).await?;
        let snapshot = response.into_snapshot();
        tracing::debug!("Fetched {} plays for game {}", snapshot.plays.len(), api_identifier);
        Ok(snapshot)
    }

    async fn get_roster(&self, api_identifier: &str) -> BingoResult<GameRoster> {
        let path = format!("gamecenter/{}/landing", api_identifier);
        let response: LandingResponse = self.fetch(api_identifier, &path).await?;
        let roster = response.into_roster();
        if roster.players.is_empty() {
            tracing::warn!("Landing page of game {} lists no players", api_identifier);
        }
        Ok(roster)
    }

    async fn get_schedule(&self, date: NaiveDate) -> BingoResult<Vec<ScheduledGame>> {
        let day = date.format("%Y-%m-%d").to_string();
        let response: ScoreboardResponse = self.fetch(&day, &format!("scoreboard/{}", day)).await?;
        let games = response.games_on(date);
        tracing::debug!("{} NHL games scheduled on {}", games.len(), day);
        Ok(games)
    }
}
