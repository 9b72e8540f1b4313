use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, DatabaseConfig};

/// Errors surfaced by the entity gateways
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => DatabaseError::Conflict(
                db.constraint()
                    .map(|c| format!("unique constraint violated: {}", c))
                    .unwrap_or_else(|| db.message().to_string()),
            ),
            other => DatabaseError::Sqlx(other),
        }
    }
}

/// Open the connection pool, check the database is reachable, and apply migrations when enabled
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let url = config.connection_url()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(&url)
        .await
        .map_err(DatabaseError::Sqlx)?;

    health_check(&pool).await?;
    info!("Created database pool for: {}", config.name);

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Applied database migrations");
    }

    Ok(pool)
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(DatabaseError::Sqlx)?;
    Ok(())
}
