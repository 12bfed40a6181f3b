use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::config::Config;

pub const POSTGRES_MIGRATIONS_DIR: &str = "./migrations/postgres";
pub const SQLITE_MIGRATIONS_DIR: &str = "./migrations/sqlite";

pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(config.require_database_url()?)
        .await?;
    Ok(pool)
}

/// Opens the SQLite file named by `DATABASE_URL`, creating it when missing.
pub async fn create_sqlite_pool(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(config.require_database_url()?)?;
    connect_sqlite(options, config.database_max_connections).await
}

pub async fn connect_sqlite(
    options: SqliteConnectOptions,
    max_connections: u32,
) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options.create_if_missing(true).foreign_keys(true))
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool, dir: &Path) -> anyhow::Result<()> {
    let migrator = Migrator::new(dir).await?;
    migrator.run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

pub async fn run_sqlite_migrations(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let migrator = Migrator::new(dir).await?;
    migrator.run(pool).await?;
    tracing::info!("SQLite migrations completed");
    Ok(())
}
