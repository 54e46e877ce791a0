//! Admin lock repository: best-effort single-admin mutual exclusion.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::models::lock::AdminLock;
use crate::Result;

use super::parse_ts;

/// Repository for admin lock rows.
///
/// Deliberately not lease-based: the row persists until its owner (or an
/// operator) releases it, matching the manual-release-only contract.
pub struct LockRepo;

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct LockRow {
    project_id: String,
    coder: String,
    locked_at: String,
}

impl LockRow {
    fn into_lock(self) -> Result<AdminLock> {
        let locked_at = parse_ts(&self.locked_at, "locked_at")?;
        Ok(AdminLock {
            project_id: self.project_id,
            coder: self.coder,
            locked_at,
        })
    }
}

impl LockRepo {
    /// Acquire the project lock if no lock exists. Returns whether this
    /// call created the row.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn acquire_if_absent(
        conn: &mut SqliteConnection,
        project_id: &str,
        coder: &str,
    ) -> Result<bool> {
        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO admin_lock (project_id, coder, locked_at) VALUES (?1, ?2, ?3)",
        )
        .bind(project_id)
        .bind(coder)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *conn)
        .await?;
        Ok(inserted.rows_affected() > 0)
    }

    /// Release the lock only if the caller owns it. Returns whether a
    /// row was removed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn release_own(
        conn: &mut SqliteConnection,
        project_id: &str,
        coder: &str,
    ) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM admin_lock WHERE project_id = ?1 AND coder = ?2")
            .bind(project_id)
            .bind(coder)
            .execute(&mut *conn)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }

    /// The live lock for a project, if any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get(conn: &mut SqliteConnection, project_id: &str) -> Result<Option<AdminLock>> {
        let row: Option<LockRow> = sqlx::query_as("SELECT * FROM admin_lock WHERE project_id = ?1")
            .bind(project_id)
            .fetch_optional(&mut *conn)
            .await?;
        row.map(LockRow::into_lock).transpose()
    }
}
