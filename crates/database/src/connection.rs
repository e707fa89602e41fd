//! Store connection management

use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::fs;
use tracing::info;

use crate::types::DatabaseError;

/// Open a SQLite pool for `url` with foreign keys, WAL and a busy timeout
/// applied to every connection.
pub async fn prepare_database(url: &str, max_connections: u32) -> Result<SqlitePool> {
    ensure_sqlite_path(url).await?;

    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid store locator {url}"))?
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to database {url}"))?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .with_context(|| format!("database {url} did not answer a health check query"))?;

    info!(url = %url, "database connection established");
    Ok(pool)
}

fn sqlite_file(url: &str) -> Option<&str> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(path)
    }
}

/// Ensure the SQLite database file and directory exist
async fn ensure_sqlite_path(url: &str) -> Result<()> {
    let Some(sqlite_path) = sqlite_file(url) else {
        return Ok(());
    };

    let path = Path::new(sqlite_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create sqlite directory {}", parent.display())
            })?;
        }
    }

    if fs::metadata(path).await.is_err() {
        fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .await
            .with_context(|| format!("failed to create sqlite database file {}", path.display()))?;
    }

    Ok(())
}

/// Run a store query under a deadline. An elapsed deadline is reported as
/// [`DatabaseError::Timeout`], never as an empty result.
pub(crate) async fn bounded<T, E, F>(limit: Duration, operation: &'static str, query: F) -> Result<T, E>
where
    F: Future<Output = Result<T, sqlx::Error>>,
    E: From<sqlx::Error> + From<DatabaseError>,
{
    match tokio::time::timeout(limit, query).await {
        Ok(result) => result.map_err(E::from),
        Err(_) => Err(E::from(DatabaseError::Timeout(operation.to_string()))),
    }
}
