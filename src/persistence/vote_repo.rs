//! Reliability vote repository: the append-only IRR log.

use sqlx::SqliteConnection;

use crate::models::vote::ReliabilityVote;
use crate::Result;

use super::parse_ts;

/// Repository for reliability vote rows.
pub struct VoteRepo;

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct VoteRow {
    id: String,
    item_id: String,
    coder: String,
    label_id: Option<String>,
    reason: String,
    created_at: String,
}

impl VoteRow {
    fn into_vote(self) -> Result<ReliabilityVote> {
        let created_at = parse_ts(&self.created_at, "created_at")?;
        Ok(ReliabilityVote {
            id: self.id,
            item_id: self.item_id,
            coder: self.coder,
            label_id: self.label_id,
            reason: self.reason,
            created_at,
        })
    }
}

impl VoteRepo {
    /// Append a vote to the log.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn append(conn: &mut SqliteConnection, vote: &ReliabilityVote) -> Result<()> {
        sqlx::query(
            "INSERT INTO reliability_vote (id, item_id, coder, label_id, reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&vote.id)
        .bind(&vote.item_id)
        .bind(&vote.coder)
        .bind(&vote.label_id)
        .bind(&vote.reason)
        .bind(vote.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Number of votes recorded for an item.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn count_for_item(conn: &mut SqliteConnection, item_id: &str) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reliability_vote WHERE item_id = ?1")
            .bind(item_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0)
    }

    /// All votes for an item, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn for_item(
        conn: &mut SqliteConnection,
        item_id: &str,
    ) -> Result<Vec<ReliabilityVote>> {
        let rows: Vec<VoteRow> = sqlx::query_as(
            "SELECT * FROM reliability_vote WHERE item_id = ?1 ORDER BY created_at ASC",
        )
        .bind(item_id)
        .fetch_all(&mut *conn)
        .await?;
        rows.into_iter().map(VoteRow::into_vote).collect()
    }

    /// Whether a coder has already voted on an item.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn has_vote(
        conn: &mut SqliteConnection,
        item_id: &str,
        coder: &str,
    ) -> Result<bool> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reliability_vote WHERE item_id = ?1 AND coder = ?2",
        )
        .bind(item_id)
        .bind(coder)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row.0 > 0)
    }

    /// Delete every vote for an item, returning the count removed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn purge_item(conn: &mut SqliteConnection, item_id: &str) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM reliability_vote WHERE item_id = ?1")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;
        Ok(deleted.rows_affected())
    }
}
