//! Connection pool setup, schema migration and role seeding.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::auth::RoleKind;
use crate::error::AppError;

/// Opens a pool for `database_url`, creating the file if needed.
///
/// Foreign keys are enforced on every connection. In-memory databases keep their
/// connections alive for the lifetime of the pool, otherwise the schema would
/// vanish with the last idle connection.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
    if database_url.contains(":memory:") {
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    log::info!("Connecting to database {}", database_url);
    Ok(pool_options.connect_with(options).await?)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    log::info!("Running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Inserts every `RoleKind` that is not yet present. Safe to run on each start.
pub async fn seed_roles(pool: &SqlitePool) -> Result<(), AppError> {
    for role in RoleKind::ALL {
        let inserted = sqlx::query("INSERT INTO roles (name) VALUES (?1) ON CONFLICT(name) DO NOTHING")
            .bind(role.as_str())
            .execute(pool)
            .await?
            .rows_affected();
        if inserted > 0 {
            log::info!("Seeded role {}", role.as_str());
        }
    }
    Ok(())
}

/// Pool, schema and seed data in one call; used by `main` and the tests.
pub async fn setup(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let pool = init_pool(database_url, max_connections).await?;
    run_migrations(&pool).await?;
    seed_roles(&pool).await?;
    Ok(pool)
}
