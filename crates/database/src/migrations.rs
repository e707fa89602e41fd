//! Database migrations

use anyhow::Context;
use sqlx::{migrate::Migrator, SqlitePool};
use tracing::info;

/// Schema of the tenant registry.
pub static REGISTRY_MIGRATOR: Migrator = sqlx::migrate!("./migrations/registry");

/// Schema shared by the default store and every tenant store.
pub static STORE_MIGRATOR: Migrator = sqlx::migrate!("./migrations/store");

pub async fn run_registry_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    REGISTRY_MIGRATOR
        .run(pool)
        .await
        .context("registry migrations failed")?;
    info!("registry migrations applied");
    Ok(())
}

pub async fn run_store_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    STORE_MIGRATOR
        .run(pool)
        .await
        .context("store migrations failed")?;
    info!("store migrations applied");
    Ok(())
}
