//! Equipment Rental Server
//!
//! REST API server for construction equipment rentals.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use rental_server::{
    api,
    clock::SystemClock,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::{email::EmailService, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Must stay alive for buffered file logs to be flushed
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting Rental Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let repository = Repository::new(pool);
    let services = Services::new(
        repository.stores(),
        &config,
        Arc::new(SystemClock),
        Arc::new(EmailService::new(config.email.clone())),
    );

    services.auth.bootstrap_admin().await?;

    if config.scheduler.enabled {
        services.sweeper.clone().spawn(&config.scheduler)?;
    } else {
        tracing::info!("Lifecycle sweeper disabled");
    }

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid host address '{}'", config.server.host))?,
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        repository,
    };
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Console logs (pretty or JSON), plus a daily rolling file when a directory is configured
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("rental_server={},tower_http=debug", logging.level).into());

    let console = match logging.format.as_str() {
        "json" => fmt::layer().json().boxed(),
        _ => fmt::layer().boxed(),
    };

    let (file, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "rental-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    guard
}
