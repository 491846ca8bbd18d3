use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::config::DatabaseConfig;

/// Errors raised while bootstrapping the connection pool
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection pool construction and liveness checks for the relational store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Opens the shared pool. Handlers never see the pool directly; it is
    /// owned by `PostgresStorage`.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::connection_string(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&connection_string)
            .await?;

        info!(
            "Created database pool for {}:{} (max {} connections)",
            config.host, config.port, config.max_connections
        );
        Ok(pool)
    }

    /// Uses `DATABASE_URL` when given, otherwise assembles one from the
    /// individual `DB_*` settings.
    pub fn connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        if let Some(url) = &config.url {
            let parsed =
                Url::parse(url).map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?;
            return Ok(parsed.into());
        }

        let base = format!("postgres://{}:{}/{}", config.host, config.port, config.name);
        let mut url = Url::parse(&base).map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?;

        url.set_username(&config.user)
            .map_err(|_| DatabaseError::InvalidDatabaseUrl("cannot set username".to_string()))?;
        if !config.password.is_empty() {
            url.set_password(Some(&config.password))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl("cannot set password".to_string()))?;
        }

        Ok(url.into())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
