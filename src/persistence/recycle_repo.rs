//! Recycle bin repository: soft-delete markers.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::models::recycle::RecycleEntry;
use crate::{AppError, Result};

use super::parse_ts;

/// Repository for recycle bin rows.
pub struct RecycleRepo;

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct RecycleRow {
    item_id: String,
    recycled_at: String,
}

impl RecycleRow {
    fn into_entry(self) -> Result<RecycleEntry> {
        let recycled_at = parse_ts(&self.recycled_at, "recycled_at")?;
        Ok(RecycleEntry {
            item_id: self.item_id,
            recycled_at,
        })
    }
}

impl RecycleRepo {
    /// Soft-delete an item.
    ///
    /// Clears any active assignment or queue membership in the same
    /// breath: a recycled item must never simultaneously hold either.
    /// Idempotent for an already-recycled item.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if any statement fails.
    pub async fn recycle(conn: &mut SqliteConnection, item_id: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO recycle_entry (item_id, recycled_at) VALUES (?1, ?2)")
            .bind(item_id)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *conn)
            .await?;

        sqlx::query("DELETE FROM assignment WHERE item_id = ?1")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM queue_entry WHERE item_id = ?1")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("UPDATE item SET state = 'recycled' WHERE id = ?1")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Restore a soft-deleted item to the available state.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item is not in the recycle
    /// bin, `AppError::Db` on other failures.
    pub async fn restore(conn: &mut SqliteConnection, item_id: &str) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM recycle_entry WHERE item_id = ?1")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "item {item_id} is not in the recycle bin"
            )));
        }

        sqlx::query("UPDATE item SET state = 'available' WHERE id = ?1 AND state = 'recycled'")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Whether an item is currently recycled.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn is_recycled(conn: &mut SqliteConnection, item_id: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recycle_entry WHERE item_id = ?1")
            .bind(item_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0 > 0)
    }

    /// Recycle entries for a project's items, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn for_project(
        conn: &mut SqliteConnection,
        project_id: &str,
    ) -> Result<Vec<RecycleEntry>> {
        let rows: Vec<RecycleRow> = sqlx::query_as(
            "SELECT r.item_id, r.recycled_at FROM recycle_entry r
             JOIN item i ON i.id = r.item_id
             WHERE i.project_id = ?1
             ORDER BY r.recycled_at ASC",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await?;
        rows.into_iter().map(RecycleRow::into_entry).collect()
    }
}
