//! Change audit repository: the immutable log of label corrections.
//!
//! Write-once by construction — no update or delete is exposed.

use sqlx::SqliteConnection;

use crate::models::audit::ChangeLogEntry;
use crate::Result;

use super::parse_ts;

/// Repository for change log rows.
pub struct AuditRepo;

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct ChangeLogRow {
    id: String,
    project_id: String,
    item_id: String,
    coder: String,
    old_label_name: String,
    new_label_name: String,
    changed_at: String,
}

impl ChangeLogRow {
    fn into_entry(self) -> Result<ChangeLogEntry> {
        let changed_at = parse_ts(&self.changed_at, "changed_at")?;
        Ok(ChangeLogEntry {
            id: self.id,
            project_id: self.project_id,
            item_id: self.item_id,
            coder: self.coder,
            old_label_name: self.old_label_name,
            new_label_name: self.new_label_name,
            changed_at,
        })
    }
}

impl AuditRepo {
    /// Append a correction record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn append(conn: &mut SqliteConnection, entry: &ChangeLogEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO change_log (id, project_id, item_id, coder, old_label_name,
             new_label_name, changed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&entry.id)
        .bind(&entry.project_id)
        .bind(&entry.item_id)
        .bind(&entry.coder)
        .bind(&entry.old_label_name)
        .bind(&entry.new_label_name)
        .bind(entry.changed_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// All corrections recorded for a project, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn for_project(
        conn: &mut SqliteConnection,
        project_id: &str,
    ) -> Result<Vec<ChangeLogEntry>> {
        let rows: Vec<ChangeLogRow> = sqlx::query_as(
            "SELECT * FROM change_log WHERE project_id = ?1 ORDER BY changed_at ASC",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await?;
        rows.into_iter().map(ChangeLogRow::into_entry).collect()
    }
}
