use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gym_api::config::AppConfig;
use gym_api::database::{init_schema, DatabaseManager, PostgresStorage};
use gym_api::{app, AppState};

#[derive(Parser, Debug)]
#[command(name = "gym-api", version, about = "Gym ratings REST API")]
struct Args {
    /// Interface to bind (overrides GYM_API_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides GYM_API_PORT / PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Do not create missing tables on startup
    #[arg(long)]
    skip_schema_init: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let default_filter = if config.is_development() {
        "gym_api=debug,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting gym API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    DatabaseManager::health_check(&pool).await?;

    if args.skip_schema_init {
        tracing::info!("Skipping schema initialization");
    } else {
        init_schema(&pool).await.context("failed to initialize schema")?;
    }

    let storage = PostgresStorage::new(pool, &config);
    let bind_addr = config.bind_address();
    let state = AppState::new(Arc::new(storage), config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Gym API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
