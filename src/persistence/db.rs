//! `SQLite` connection pool setup and schema bootstrap.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::{AppError, Result};

use super::schema;

/// Alias for the shared `SQLite` pool.
pub type Database = SqlitePool;

/// Connect to the on-disk database, creating the file if missing, and
/// apply the schema.
///
/// WAL journaling keeps readers unblocked while a writer commits;
/// the busy timeout lets concurrent write transactions queue instead of
/// failing immediately.
///
/// # Errors
///
/// Returns `AppError::Db` if the connection or schema application fails.
pub async fn connect(path: impl AsRef<Path>) -> Result<Database> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    schema::bootstrap_schema(&pool).await?;
    Ok(pool)
}

/// Connect to a fresh in-memory database and apply the schema.
///
/// The pool is capped at a single connection: every `SQLite` `:memory:`
/// connection is its own database, so a larger pool would hand out
/// empty databases to all but the first caller.
///
/// # Errors
///
/// Returns `AppError::Db` if the connection or schema application fails.
pub async fn connect_memory() -> Result<Database> {
    let options = "sqlite::memory:"
        .parse::<SqliteConnectOptions>()
        .map_err(|err| AppError::Db(format!("invalid memory dsn: {err}")))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    schema::bootstrap_schema(&pool).await?;
    Ok(pool)
}
