//! Assignment tracker repository: exclusive checkout of items to coders.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::models::assignment::Assignment;
use crate::{AppError, Result};

use super::parse_ts;

/// Repository for active assignment rows.
///
/// The schema's primary key on `item_id` is the uniqueness guard: an
/// item can never be checked out by two coders concurrently.
pub struct AssignmentRepo;

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct AssignmentRow {
    item_id: String,
    coder: String,
    assigned_at: String,
}

impl AssignmentRow {
    fn into_assignment(self) -> Result<Assignment> {
        let assigned_at = parse_ts(&self.assigned_at, "assigned_at")?;
        Ok(Assignment {
            item_id: self.item_id,
            coder: self.coder,
            assigned_at,
        })
    }
}

impl AssignmentRepo {
    /// Check an item out to a coder.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AlreadyAssigned` if an active assignment
    /// exists for the item, `AppError::Db` on other failures.
    pub async fn assign(conn: &mut SqliteConnection, item_id: &str, coder: &str) -> Result<()> {
        let insert = sqlx::query(
            "INSERT INTO assignment (item_id, coder, assigned_at) VALUES (?1, ?2, ?3)",
        )
        .bind(item_id)
        .bind(coder)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *conn)
        .await;

        match insert {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(AppError::AlreadyAssigned(format!(
                    "item {item_id} is already checked out"
                )));
            }
            Err(err) => return Err(err.into()),
        }

        sqlx::query("UPDATE item SET state = 'assigned' WHERE id = ?1 AND state = 'available'")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Race-safe claim used by batch fetch: compare-and-swap the item
    /// from `available` to `assigned`, then create the assignment row.
    ///
    /// Returns `false` when another coder won the item between candidate
    /// selection and the claim.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AlreadyAssigned` if a stale assignment row
    /// exists for an available item (invariant violation), `AppError::Db`
    /// on other failures.
    pub async fn claim(conn: &mut SqliteConnection, item_id: &str, coder: &str) -> Result<bool> {
        let swapped =
            sqlx::query("UPDATE item SET state = 'assigned' WHERE id = ?1 AND state = 'available'")
                .bind(item_id)
                .execute(&mut *conn)
                .await?;
        if swapped.rows_affected() == 0 {
            return Ok(false);
        }

        let insert = sqlx::query(
            "INSERT INTO assignment (item_id, coder, assigned_at) VALUES (?1, ?2, ?3)",
        )
        .bind(item_id)
        .bind(coder)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *conn)
        .await;

        match insert {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::AlreadyAssigned(format!(
                    "available item {item_id} had a stale assignment row"
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Release a coder's checkout of an item, returning it to the
    /// available state unless recycled.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotAssigned` if no active assignment exists
    /// for the (item, coder) pair, `AppError::Db` on other failures.
    pub async fn release(conn: &mut SqliteConnection, item_id: &str, coder: &str) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM assignment WHERE item_id = ?1 AND coder = ?2")
            .bind(item_id)
            .bind(coder)
            .execute(&mut *conn)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotAssigned(format!(
                "item {item_id} is not checked out by {coder}"
            )));
        }

        sqlx::query("UPDATE item SET state = 'available' WHERE id = ?1 AND state = 'assigned'")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Drop a coder's assignment row if one exists, without touching
    /// item state. Used on recycled items, where the eager invariant
    /// cleanup may already have removed the row.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn drop_if_present(
        conn: &mut SqliteConnection,
        item_id: &str,
        coder: &str,
    ) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM assignment WHERE item_id = ?1 AND coder = ?2")
            .bind(item_id)
            .bind(coder)
            .execute(&mut *conn)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }

    /// Release every assignment held by a coder, returning the number of
    /// rows dropped. Items still in the assigned state go back to
    /// available; recycled items just lose the row.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update or delete fails.
    pub async fn release_all(conn: &mut SqliteConnection, coder: &str) -> Result<u64> {
        sqlx::query(
            "UPDATE item SET state = 'available'
             WHERE state = 'assigned'
               AND id IN (SELECT item_id FROM assignment WHERE coder = ?1)",
        )
        .bind(coder)
        .execute(&mut *conn)
        .await?;

        let deleted = sqlx::query("DELETE FROM assignment WHERE coder = ?1")
            .bind(coder)
            .execute(&mut *conn)
            .await?;
        Ok(deleted.rows_affected())
    }

    /// The active assignment for an item, if any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get(conn: &mut SqliteConnection, item_id: &str) -> Result<Option<Assignment>> {
        let row: Option<AssignmentRow> =
            sqlx::query_as("SELECT * FROM assignment WHERE item_id = ?1")
                .bind(item_id)
                .fetch_optional(&mut *conn)
                .await?;
        row.map(AssignmentRow::into_assignment).transpose()
    }

    /// Item ids of a coder's active assignments within a project, in
    /// checkout order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn items_for_coder(
        conn: &mut SqliteConnection,
        coder: &str,
        project_id: &str,
    ) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT a.item_id FROM assignment a
             JOIN item i ON i.id = a.item_id
             WHERE a.coder = ?1 AND i.project_id = ?2
             ORDER BY a.assigned_at ASC",
        )
        .bind(coder)
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
