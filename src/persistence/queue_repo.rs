//! Queue store repository: named, per-project membership sets.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::models::item::QueueReason;
use crate::models::queue::{QueueEntry, QueueType};
use crate::{AppError, Result};

use super::parse_ts;

/// Repository for queue membership rows.
pub struct QueueRepo;

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct QueueRow {
    item_id: String,
    queue_type: String,
    project_id: String,
    reason: String,
    queued_at: String,
}

impl QueueRow {
    fn into_entry(self) -> Result<QueueEntry> {
        Ok(QueueEntry {
            item_id: self.item_id,
            queue_type: parse_queue_type(&self.queue_type)?,
            project_id: self.project_id,
            reason: parse_queue_reason(&self.reason)?,
            queued_at: parse_ts(&self.queued_at, "queued_at")?,
        })
    }
}

fn parse_queue_type(s: &str) -> Result<QueueType> {
    match s {
        "admin" => Ok(QueueType::Admin),
        other => Err(AppError::Db(format!("invalid queue type: {other}"))),
    }
}

fn queue_type_str(t: QueueType) -> &'static str {
    match t {
        QueueType::Admin => "admin",
    }
}

pub(crate) fn parse_queue_reason(s: &str) -> Result<QueueReason> {
    match s {
        "irr" => Ok(QueueReason::Irr),
        "skipped" => Ok(QueueReason::Skipped),
        "explicit" => Ok(QueueReason::Explicit),
        other => Err(AppError::Db(format!("invalid queue reason: {other}"))),
    }
}

pub(crate) fn queue_reason_str(r: QueueReason) -> &'static str {
    match r {
        QueueReason::Irr => "irr",
        QueueReason::Skipped => "skipped",
        QueueReason::Explicit => "explicit",
    }
}

impl QueueRepo {
    /// Add an item to a queue. Idempotent per (item, queue) pair:
    /// re-enqueuing an already-queued item is a no-op, because multiple
    /// code paths may race to escalate the same item.
    ///
    /// Recycled items are never enqueued.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert or state update fails.
    pub async fn enqueue(
        conn: &mut SqliteConnection,
        item_id: &str,
        project_id: &str,
        queue_type: QueueType,
        reason: QueueReason,
    ) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO queue_entry (item_id, queue_type, project_id, reason, queued_at)
             SELECT ?1, ?2, ?3, ?4, ?5
             WHERE (SELECT state FROM item WHERE id = ?1) != 'recycled'",
        )
        .bind(item_id)
        .bind(queue_type_str(queue_type))
        .bind(project_id)
        .bind(queue_reason_str(reason))
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            "UPDATE item SET state = 'admin_queued'
             WHERE id = ?1 AND state IN ('available', 'assigned')",
        )
        .bind(item_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Remove an item from a queue. Idempotent; returns whether a row
    /// was actually removed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete or state update fails.
    pub async fn dequeue(
        conn: &mut SqliteConnection,
        item_id: &str,
        queue_type: QueueType,
    ) -> Result<bool> {
        let deleted =
            sqlx::query("DELETE FROM queue_entry WHERE item_id = ?1 AND queue_type = ?2")
                .bind(item_id)
                .bind(queue_type_str(queue_type))
                .execute(&mut *conn)
                .await?;

        sqlx::query("UPDATE item SET state = 'available' WHERE id = ?1 AND state = 'admin_queued'")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }

    /// Members of a project's queue, in enqueue order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn members_of(
        conn: &mut SqliteConnection,
        project_id: &str,
        queue_type: QueueType,
    ) -> Result<Vec<QueueEntry>> {
        let rows: Vec<QueueRow> = sqlx::query_as(
            "SELECT * FROM queue_entry
             WHERE project_id = ?1 AND queue_type = ?2
             ORDER BY queued_at ASC",
        )
        .bind(project_id)
        .bind(queue_type_str(queue_type))
        .fetch_all(&mut *conn)
        .await?;
        rows.into_iter().map(QueueRow::into_entry).collect()
    }

    /// The queue entry for an item, if any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn entry_for(
        conn: &mut SqliteConnection,
        item_id: &str,
        queue_type: QueueType,
    ) -> Result<Option<QueueEntry>> {
        let row: Option<QueueRow> =
            sqlx::query_as("SELECT * FROM queue_entry WHERE item_id = ?1 AND queue_type = ?2")
                .bind(item_id)
                .bind(queue_type_str(queue_type))
                .fetch_optional(&mut *conn)
                .await?;
        row.map(QueueRow::into_entry).transpose()
    }
}
