use std::collections::{HashMap, HashSet};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;

use hockey_bingo_backend::config::settings::GameSettings;
use hockey_bingo_backend::db::{BingoStore, InMemoryStore};
use hockey_bingo_backend::error::{BingoError, BingoResult};
use hockey_bingo_backend::game::catalog::{default_catalog, Catalog};
use hockey_bingo_backend::models::play::Play;
use hockey_bingo_backend::models::sport_event::{GameRoster, PlayByPlay, ScheduledGame};
use hockey_bingo_backend::run;
use hockey_bingo_backend::services::{AppServices, SportsDataSource};
use hockey_bingo_backend::telemetry::{get_subscriber, init_subscriber};

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

/// Stands in for the NHL API. Rosters and plays are set per game identifier.
#[derive(Default)]
pub struct FakeDataSource {
    rosters: Mutex<HashMap<String, GameRoster>>,
    plays: Mutex<HashMap<String, Vec<Play>>>,
    failing: Mutex<HashSet<String>>,
    pbp_calls: Mutex<HashMap<String, usize>>,
    schedules: Mutex<HashMap<NaiveDate, Vec<ScheduledGame>>>,
    schedule_down: Mutex<bool>,
}

impl FakeDataSource {
    pub fn set_roster(&self, api_identifier: &str, roster: GameRoster) {
        self.rosters.lock().unwrap().insert(api_identifier.to_string(), roster);
    }

    /// Appends plays to the game's feed, as a live feed grows between polls
    pub fn push_plays(&self, api_identifier: &str, plays: Vec<Play>) {
        self.plays
            .lock()
            .unwrap()
            .entry(api_identifier.to_string())
            .or_default()
            .extend(plays);
    }

    pub fn fail(&self, api_identifier: &str) {
        self.failing.lock().unwrap().insert(api_identifier.to_string());
    }

    pub fn recover(&self, api_identifier: &str) {
        self.failing.lock().unwrap().remove(api_identifier);
    }

    pub fn set_schedule(&self, date: NaiveDate, games: Vec<ScheduledGame>) {
        self.schedules.lock().unwrap().insert(date, games);
    }

    pub fn fail_schedule(&self) {
        *self.schedule_down.lock().unwrap() = true;
    }

    pub fn play_by_play_calls(&self, api_identifier: &str) -> usize {
        self.pbp_calls.lock().unwrap().get(api_identifier).copied().unwrap_or(0)
    }

    fn check(&self, api_identifier: &str) -> BingoResult<()> {
        if self.failing.lock().unwrap().contains(api_identifier) {
            return Err(BingoError::upstream(api_identifier, "503 Service Unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl SportsDataSource for FakeDataSource {
    async fn get_play_by_play(&self, api_identifier: &str) -> BingoResult<PlayByPlay> {
        *self
            .pbp_calls
            .lock()
            .unwrap()
            .entry(api_identifier.to_string())
            .or_default() += 1;
        self.check(api_identifier)?;
        let roster = self
            .rosters
            .lock()
            .unwrap()
            .get(api_identifier)
            .cloned()
            .ok_or_else(|| BingoError::upstream(api_identifier, "404 Not Found"))?;
        let plays = self
            .plays
            .lock()
            .unwrap()
            .get(api_identifier)
            .cloned()
            .unwrap_or_default();
        Ok(PlayByPlay {
            home_team: roster.home_team,
            away_team: roster.away_team,
            plays,
        })
    }

    async fn get_roster(&self, api_identifier: &str) -> BingoResult<GameRoster> {
        self.check(api_identifier)?;
        self.rosters
            .lock()
            .unwrap()
            .get(api_identifier)
            .cloned()
            .ok_or_else(|| BingoError::upstream(api_identifier, "404 Not Found"))
    }

    async fn get_schedule(&self, date: NaiveDate) -> BingoResult<Vec<ScheduledGame>> {
        if *self.schedule_down.lock().unwrap() {
            return Err(BingoError::upstream(date.to_string(), "503 Service Unavailable"));
        }
        Ok(self.schedules.lock().unwrap().get(&date).cloned().unwrap_or_default())
    }
}

pub struct TestApp {
    pub address: String,
    pub store: InMemoryStore,
    pub data_source: Arc<FakeDataSource>,
    pub services: AppServices,
    pub catalog: Catalog,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_catalog(default_catalog().expect("Failed to build the default catalog")).await
}

pub async fn spawn_app_with_catalog(catalog: Catalog) -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    // Get port assigned by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = InMemoryStore::new();
    store.seed_catalog(&catalog).await.expect("Failed to seed catalog");
    let data_source = Arc::new(FakeDataSource::default());
    let services = AppServices::new(
        Arc::new(store.clone()),
        data_source.clone(),
        &GameSettings::default(),
        Duration::from_secs(2),
    );

    let server = run(listener, services.clone(), vec!["http://localhost:3000".to_string()])
        .expect("Failed to bind address");
    // Launch the server as a background task
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        data_source,
        services,
        catalog,
    }
}
