//! Process-wide PostgreSQL pool: built once at startup, closed on shutdown.

use std::str::FromStr;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use tracing::info;

use receiver_core::config::PostgresConfig;

use crate::error::StoreError;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Create the connection pool and verify the database answers.
///
/// Every pooled connection carries a server-side `statement_timeout`, and
/// checkouts give up after `acquire_timeout`, so an unreachable or stuck
/// database surfaces as an error instead of a hung request.
pub async fn connect_pool(config: &PostgresConfig) -> Result<PgPool, StoreError> {
    let options = connect_options(config)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(options)
        .await
        .map_err(StoreError::Connect)?;

    ping(&pool).await?;
    info!(host = %config.host, db = %config.database, "PostgreSQL connected");
    Ok(pool)
}

/// Connection options built field by field, so credentials are never
/// parsed back out of a URL.
pub(crate) fn connect_options(config: &PostgresConfig) -> Result<PgConnectOptions, StoreError> {
    let ssl_mode = PgSslMode::from_str(&config.ssl_mode).map_err(StoreError::Config)?;

    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(config.username())
        .database(&config.database)
        .ssl_mode(ssl_mode)
        .options([(
            "statement_timeout",
            config.statement_timeout().as_millis().to_string(),
        )]);
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    Ok(options)
}

/// Apply the embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied successfully");
    Ok(())
}

pub(crate) async fn ping(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(StoreError::Connect)?;
    Ok(())
}
