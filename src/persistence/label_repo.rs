//! Label store repository: labeling records keyed by item, coder, and
//! training-set generation.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::models::record::LabelingRecord;
use crate::{AppError, Result};

use super::parse_ts;

/// Repository for labeling record rows.
pub struct LabelRepo;

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct RecordRow {
    id: String,
    item_id: String,
    label_id: String,
    coder: String,
    training_set: i64,
    time_to_label_ms: Option<i64>,
    was_skipped: i64,
    reason: String,
    created_at: String,
}

impl RecordRow {
    fn into_record(self) -> Result<LabelingRecord> {
        let created_at = parse_ts(&self.created_at, "created_at")?;
        Ok(LabelingRecord {
            id: self.id,
            item_id: self.item_id,
            label_id: self.label_id,
            coder: self.coder,
            training_set: u32::try_from(self.training_set)
                .map_err(|err| AppError::Db(format!("invalid training_set: {err}")))?,
            time_to_label_ms: self.time_to_label_ms,
            was_skipped: self.was_skipped != 0,
            reason: self.reason,
            created_at,
        })
    }
}

impl LabelRepo {
    /// Append a labeling record. Never fails on valid references.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn record(conn: &mut SqliteConnection, record: &LabelingRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO labeling_record (id, item_id, label_id, coder, training_set,
             time_to_label_ms, was_skipped, reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&record.id)
        .bind(&record.item_id)
        .bind(&record.label_id)
        .bind(&record.coder)
        .bind(i64::from(record.training_set))
        .bind(record.time_to_label_ms)
        .bind(i64::from(record.was_skipped))
        .bind(&record.reason)
        .bind(record.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Update every record on the item carrying the old label to the new
    /// label, resetting the labeling time to zero. Returns the number of
    /// records updated; callers pair this with a change-audit append in
    /// the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn replace(
        conn: &mut SqliteConnection,
        item_id: &str,
        old_label_id: &str,
        new_label_id: &str,
        reason: &str,
    ) -> Result<u64> {
        let updated = sqlx::query(
            "UPDATE labeling_record
             SET label_id = ?1, reason = ?2, time_to_label_ms = 0, created_at = ?3
             WHERE item_id = ?4 AND label_id = ?5",
        )
        .bind(new_label_id)
        .bind(reason)
        .bind(Utc::now().to_rfc3339())
        .bind(item_id)
        .bind(old_label_id)
        .execute(&mut *conn)
        .await?;
        Ok(updated.rows_affected())
    }

    /// Like [`LabelRepo::replace`], restricted to one coder's record and
    /// additionally marking it skipped.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn replace_for_coder_to_skip(
        conn: &mut SqliteConnection,
        item_id: &str,
        old_label_id: &str,
        coder: &str,
        new_label_id: &str,
        reason: &str,
    ) -> Result<u64> {
        let updated = sqlx::query(
            "UPDATE labeling_record
             SET label_id = ?1, reason = ?2, time_to_label_ms = 0, was_skipped = 1,
                 created_at = ?3
             WHERE item_id = ?4 AND label_id = ?5 AND coder = ?6",
        )
        .bind(new_label_id)
        .bind(reason)
        .bind(Utc::now().to_rfc3339())
        .bind(item_id)
        .bind(old_label_id)
        .bind(coder)
        .execute(&mut *conn)
        .await?;
        Ok(updated.rows_affected())
    }

    /// Delete every record for an item, returning the count removed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn delete_all(conn: &mut SqliteConnection, item_id: &str) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM labeling_record WHERE item_id = ?1")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;
        Ok(deleted.rows_affected())
    }

    /// Delete every non-skip record for an item, returning the count
    /// removed. Used when a skip record must survive an invalidation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn delete_all_except_skipped(
        conn: &mut SqliteConnection,
        item_id: &str,
    ) -> Result<u64> {
        let deleted =
            sqlx::query("DELETE FROM labeling_record WHERE item_id = ?1 AND was_skipped = 0")
                .bind(item_id)
                .execute(&mut *conn)
                .await?;
        Ok(deleted.rows_affected())
    }

    /// Number of records a coder has produced for a label. Read-only
    /// reporting count.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn count_for(
        conn: &mut SqliteConnection,
        coder: &str,
        label_id: &str,
    ) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM labeling_record WHERE coder = ?1 AND label_id = ?2",
        )
        .bind(coder)
        .bind(label_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row.0)
    }

    /// All records for an item, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn for_item(
        conn: &mut SqliteConnection,
        item_id: &str,
    ) -> Result<Vec<LabelingRecord>> {
        let rows: Vec<RecordRow> = sqlx::query_as(
            "SELECT * FROM labeling_record WHERE item_id = ?1 ORDER BY created_at ASC",
        )
        .bind(item_id)
        .fetch_all(&mut *conn)
        .await?;
        rows.into_iter().map(RecordRow::into_record).collect()
    }

    /// The skip record for an item, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn skipped_record(
        conn: &mut SqliteConnection,
        item_id: &str,
    ) -> Result<Option<LabelingRecord>> {
        let row: Option<RecordRow> = sqlx::query_as(
            "SELECT * FROM labeling_record WHERE item_id = ?1 AND was_skipped = 1 LIMIT 1",
        )
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await?;
        row.map(RecordRow::into_record).transpose()
    }
}
