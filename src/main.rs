use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;

use hockey_bingo_backend::config::get_config;
use hockey_bingo_backend::db::{BingoStore, PgBingoStore};
use hockey_bingo_backend::game::catalog::default_catalog;
use hockey_bingo_backend::run;
use hockey_bingo_backend::services::{AppServices, NhlApiClient, SchedulerService};
use hockey_bingo_backend::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Panic if we can't read the config
    let config = get_config().expect("Failed to read the config.");

    let subscriber = get_subscriber(
        "hockey-bingo-backend".into(),
        config.application.log_level.clone(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    // Only try to establish connection when actually used
    let connection_pool = PgPoolOptions::new()
        .max_connections(32)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect_lazy(config.database.connection_string().expose_secret())
        .expect("Failed to create Postgres connection pool");

    if let Err(e) = sqlx::migrate!("./migrations").run(&connection_pool).await {
        tracing::error!("❌ Failed to run database migrations: {}", e);
        std::process::exit(1);
    }

    let store: Arc<dyn BingoStore> = Arc::new(PgBingoStore::new(connection_pool));
    if config.application.seed_catalog {
        let seeded = match default_catalog() {
            Ok(catalog) => store.seed_catalog(&catalog).await,
            Err(e) => Err(e),
        };
        if let Err(e) = seeded {
            tracing::error!("❌ Failed to seed the catalog: {}", e);
            std::process::exit(1);
        }
    }

    let data_source = Arc::new(NhlApiClient::new(
        config.nhl_api.base_url.clone(),
        config.nhl_api.timeout(),
    ));
    let services = AppServices::new(store, data_source, &config.game, config.nhl_api.timeout());

    let scheduler_service = match SchedulerService::new(services.updates.clone(), &config.scheduler).await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!("❌ Failed to create scheduler service: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = scheduler_service.start().await {
        tracing::error!("❌ Failed to start scheduler: {}", e);
        std::process::exit(1);
    }

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Listening on {}", address);

    run(listener, services, config.application.allowed_origins.clone())?.await
}
