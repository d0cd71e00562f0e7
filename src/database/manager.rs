use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use super::store::StoreError;
use crate::config::DatabaseConfig;

/// Builds the PostgreSQL pool and applies the embedded migrations.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect using `DATABASE_URL` and the pool settings of the active profile.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(
            "Created database pool (max {} connections)",
            config.max_connections
        );
        Ok(pool)
    }

    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(pool: PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}
