//! Item repository for `SQLite` persistence.

use sqlx::SqliteConnection;

use crate::models::item::{Item, ItemState};
use crate::{AppError, Result};

use super::parse_ts;

/// Repository for work item rows and their lifecycle state column.
pub struct ItemRepo;

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
pub(crate) struct ItemRow {
    id: String,
    project_id: String,
    text: String,
    reliability_flag: i64,
    sensitive_flag: i64,
    state: String,
    created_at: String,
}

impl ItemRow {
    pub(crate) fn into_item(self) -> Result<Item> {
        let state = parse_item_state(&self.state)?;
        let created_at = parse_ts(&self.created_at, "created_at")?;
        Ok(Item {
            id: self.id,
            project_id: self.project_id,
            text: self.text,
            reliability_flag: self.reliability_flag != 0,
            sensitive_flag: self.sensitive_flag != 0,
            state,
            created_at,
        })
    }
}

pub(crate) fn parse_item_state(s: &str) -> Result<ItemState> {
    match s {
        "available" => Ok(ItemState::Available),
        "assigned" => Ok(ItemState::Assigned),
        "admin_queued" => Ok(ItemState::AdminQueued),
        "recycled" => Ok(ItemState::Recycled),
        other => Err(AppError::Db(format!("invalid item state: {other}"))),
    }
}

pub(crate) fn item_state_str(state: ItemState) -> &'static str {
    match state {
        ItemState::Available => "available",
        ItemState::Assigned => "assigned",
        ItemState::AdminQueued => "admin_queued",
        ItemState::Recycled => "recycled",
    }
}

impl ItemRepo {
    /// Insert a new item record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn create(conn: &mut SqliteConnection, item: &Item) -> Result<()> {
        sqlx::query(
            "INSERT INTO item (id, project_id, text, reliability_flag, sensitive_flag,
             state, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&item.id)
        .bind(&item.project_id)
        .bind(&item.text)
        .bind(i64::from(item.reliability_flag))
        .bind(i64::from(item.sensitive_flag))
        .bind(item_state_str(item.state))
        .bind(item.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Retrieve an item by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item does not exist.
    pub async fn get(conn: &mut SqliteConnection, id: &str) -> Result<Item> {
        let row: Option<ItemRow> = sqlx::query_as("SELECT * FROM item WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        row.map(ItemRow::into_item)
            .transpose()?
            .ok_or_else(|| AppError::NotFound(format!("item {id} not found")))
    }

    /// Set the sensitive flag to the supplied value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn set_sensitive(conn: &mut SqliteConnection, id: &str, value: bool) -> Result<()> {
        sqlx::query("UPDATE item SET sensitive_flag = ?1 WHERE id = ?2")
            .bind(i64::from(value))
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Clear the reliability flag.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn clear_reliability(conn: &mut SqliteConnection, id: &str) -> Result<()> {
        sqlx::query("UPDATE item SET reliability_flag = 0 WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Mark an item explicit: clear the reliability flag and set the
    /// sensitive flag in one update. Used by the sensitive-content
    /// short-circuit during submission.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn mark_explicit(conn: &mut SqliteConnection, id: &str) -> Result<()> {
        sqlx::query("UPDATE item SET reliability_flag = 0, sensitive_flag = 1 WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Candidate items for distribution to a coder, oldest first.
    ///
    /// An item qualifies when it is in the available state and either
    /// untouched (no labeling records, no reliability votes) or a
    /// reliability item still collecting votes that this coder has
    /// neither voted on nor labeled.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn distributable(
        conn: &mut SqliteConnection,
        project_id: &str,
        coder: &str,
        required_irr_voters: u32,
        limit: u32,
    ) -> Result<Vec<Item>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT i.* FROM item i
             WHERE i.project_id = ?1
               AND i.state = 'available'
               AND (
                     (NOT EXISTS (SELECT 1 FROM labeling_record lr WHERE lr.item_id = i.id)
                      AND NOT EXISTS (SELECT 1 FROM reliability_vote rv WHERE rv.item_id = i.id))
                  OR (i.reliability_flag = 1
                      AND (SELECT COUNT(*) FROM reliability_vote rv
                           WHERE rv.item_id = i.id) < ?2
                      AND NOT EXISTS (SELECT 1 FROM reliability_vote rv
                                      WHERE rv.item_id = i.id AND rv.coder = ?3)
                      AND NOT EXISTS (SELECT 1 FROM labeling_record lr
                                      WHERE lr.item_id = i.id AND lr.coder = ?3))
               )
             ORDER BY i.created_at ASC
             LIMIT ?4",
        )
        .bind(project_id)
        .bind(i64::from(required_irr_voters))
        .bind(coder)
        .bind(i64::from(limit))
        .fetch_all(&mut *conn)
        .await?;
        rows.into_iter().map(ItemRow::into_item).collect()
    }
}
