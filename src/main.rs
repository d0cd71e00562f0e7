use anyhow::Context;
use clap::Parser;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use floki_api::config::AppConfig;
use floki_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use floki_api::server;
use floki_api::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "floki-api", version, about = "Floki project management API")]
struct Cli {
    /// Listen port; overrides PORT
    #[arg(long)]
    port: Option<u16>,

    /// Keep data in process memory instead of PostgreSQL (lost on exit)
    #[arg(long)]
    in_memory: bool,

    /// Do not apply pending migrations at startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("floki_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    tracing::info!("Starting Floki API in {:?} mode", config.environment);

    let (store, pool): (Arc<dyn Store>, Option<PgPool>) = if cli.in_memory {
        tracing::warn!("Using the in-memory store; data is lost on exit");
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        (store, None)
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to the database")?;
        if !cli.skip_migrations {
            DatabaseManager::migrate(&pool)
                .await
                .context("failed to apply migrations")?;
        }
        let store: Arc<dyn Store> = Arc::new(PgStore::new(pool.clone()));
        (store, Some(pool))
    };

    let port = config.server.port;
    let state = AppState::new(config, store).context("invalid security configuration")?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;

    tracing::info!("HTTP running at http://localhost:{}", port);

    server::serve(listener, state).await.context("server error")?;

    if let Some(pool) = pool {
        DatabaseManager::close(pool).await;
    }
    Ok(())
}
