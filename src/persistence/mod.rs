//! Persistence layer modules.
//!
//! One repository per store, all operating on `&mut SqliteConnection`
//! so the workflow coordinator can compose them inside a single
//! transaction.

use chrono::{DateTime, Utc};

use crate::{AppError, Result};

pub mod assignment_repo;
pub mod audit_repo;
pub mod db;
pub mod item_repo;
pub mod label_repo;
pub mod lock_repo;
pub mod project_repo;
pub mod queue_repo;
pub mod recycle_repo;
pub mod schema;
pub mod vote_repo;

/// Re-export the database pool type for convenience.
pub use sqlx::SqlitePool;

/// Parse an RFC 3339 text column into a UTC timestamp.
pub(crate) fn parse_ts(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| AppError::Db(format!("invalid {column}: {err}")))
}
