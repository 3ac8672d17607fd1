pub mod board_service;
pub mod game_service;
pub mod nhl_client;
pub mod scheduler;
pub mod sport_event_service;
pub mod square_update_service;

pub use board_service::BoardService;
pub use game_service::{GameService, NewGame};
pub use nhl_client::{NhlApiClient, SportsDataSource};
pub use scheduler::SchedulerService;
pub use sport_event_service::SportEventService;
pub use square_update_service::{SquareUpdateService, UpdateCycleSummary};

use std::sync::Arc;
use std::time::Duration;

use crate::config::settings::GameSettings;
use crate::db::store::BingoStore;

/// Every service the HTTP layer and the scheduler use, sharing one store and one data source
#[derive(Clone)]
pub struct AppServices {
    pub boards: Arc<BoardService>,
    pub updates: Arc<SquareUpdateService>,
    pub sport_events: Arc<SportEventService>,
    pub games: Arc<GameService>,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn BingoStore>,
        data_source: Arc<dyn SportsDataSource>,
        game: &GameSettings,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            boards: Arc::new(BoardService::new(store.clone(), data_source.clone(), game.generator())),
            updates: Arc::new(SquareUpdateService::new(
                store.clone(),
                data_source.clone(),
                game.game_ttl(),
                fetch_timeout,
            )),
            sport_events: Arc::new(SportEventService::new(store.clone(), data_source)),
            games: Arc::new(GameService::new(store, game.default_reroll_allowance)),
        }
    }
}
