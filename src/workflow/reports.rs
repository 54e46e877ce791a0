//! Read-only reporting queries over the workflow stores.
//!
//! These back the admin review table, the recycle bin table, and the
//! coder history view. Nothing here mutates state.

use serde::Serialize;
use sqlx::SqliteConnection;

use crate::models::item::{Item, QueueReason};
use crate::persistence::db::Database;
use crate::persistence::item_repo;
use crate::persistence::queue_repo::parse_queue_reason;
use crate::Result;

/// One row of the admin review table.
#[derive(Debug, Clone, Serialize)]
pub struct AdminTableRow {
    /// Queued item identifier.
    pub item_id: String,
    /// Item text payload.
    pub text: String,
    /// Why the item was enqueued.
    pub reason: QueueReason,
    /// Skip label name, when a skip record exists for a non-IRR row.
    pub label: Option<String>,
    /// Skip label identifier.
    pub label_id: Option<String>,
    /// Skip justification text.
    pub label_reason: Option<String>,
    /// Whether the item is marked sensitive.
    pub sensitive: bool,
}

/// Admin queue membership counts, split by enqueue reason.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AdminCounts {
    /// Items skipped on the normal path.
    pub skipped: i64,
    /// Items escalated from reliability voting.
    pub irr: i64,
    /// Items flagged as sensitive content.
    pub explicit: i64,
}

/// One row of the recycle bin table.
#[derive(Debug, Clone, Serialize)]
pub struct RecycleTableRow {
    /// Recycled item identifier.
    pub item_id: String,
    /// Item text payload.
    pub text: String,
}

/// One row of a coder's labeling history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    /// Labeled item identifier.
    pub item_id: String,
    /// Item text payload.
    pub text: String,
    /// Applied label name.
    pub label: String,
    /// Applied label identifier.
    pub label_id: String,
    /// Justification text supplied at labeling time.
    pub reason: String,
    /// When the label was produced (RFC 3339).
    pub labeled_at: String,
    /// Whether the coder may still modify this record. Reliability
    /// votes are read-only once cast.
    pub editable: bool,
    /// Whether the item is marked sensitive.
    pub sensitive: bool,
}

/// Per-label usage counts for one coder.
#[derive(Debug, Clone, Serialize)]
pub struct CoderDistribution {
    /// Coder the counts belong to.
    pub coder: String,
    /// (label name, count) pairs in label-name order.
    pub counts: Vec<LabelCount>,
}

/// Usage count of one label.
#[derive(Debug, Clone, Serialize)]
pub struct LabelCount {
    /// Label name.
    pub label: String,
    /// Number of records carrying it.
    pub count: i64,
}

/// The admin review queue for a project, with skip details where they
/// exist.
///
/// # Errors
///
/// Returns `AppError::Db` if any query fails.
pub async fn admin_table(db: &Database, project_id: &str) -> Result<Vec<AdminTableRow>> {
    let mut conn = db.acquire().await?;

    let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
        "SELECT q.item_id, i.text, q.reason, i.sensitive_flag
         FROM queue_entry q
         JOIN item i ON i.id = q.item_id
         WHERE q.project_id = ?1 AND q.queue_type = 'admin'
         ORDER BY q.queued_at ASC",
    )
    .bind(project_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut table = Vec::with_capacity(rows.len());
    for (item_id, text, raw_reason, sensitive) in rows {
        let reason = parse_queue_reason(&raw_reason)?;

        let skip_detail: Option<(String, String, String)> = if reason == QueueReason::Irr {
            None
        } else {
            sqlx::query_as(
                "SELECT l.name, l.id, lr.reason
                 FROM labeling_record lr
                 JOIN label l ON l.id = lr.label_id
                 WHERE lr.item_id = ?1 AND lr.was_skipped = 1
                 LIMIT 1",
            )
            .bind(&item_id)
            .fetch_optional(&mut *conn)
            .await?
        };

        let (label, label_id, label_reason) = match skip_detail {
            Some((name, id, why)) => (Some(name), Some(id), Some(why)),
            None => (None, None, None),
        };
        table.push(AdminTableRow {
            item_id,
            text,
            reason,
            label,
            label_id,
            label_reason,
            sensitive: sensitive != 0,
        });
    }
    Ok(table)
}

/// Admin queue counts by enqueue reason.
///
/// # Errors
///
/// Returns `AppError::Db` if the query fails.
pub async fn admin_counts(db: &Database, project_id: &str) -> Result<AdminCounts> {
    let mut conn = db.acquire().await?;

    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT reason, COUNT(*) FROM queue_entry
         WHERE project_id = ?1 AND queue_type = 'admin'
         GROUP BY reason",
    )
    .bind(project_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut counts = AdminCounts::default();
    for (reason, count) in rows {
        match parse_queue_reason(&reason)? {
            QueueReason::Skipped => counts.skipped = count,
            QueueReason::Irr => counts.irr = count,
            QueueReason::Explicit => counts.explicit = count,
        }
    }
    Ok(counts)
}

/// The recycle bin contents for a project.
///
/// # Errors
///
/// Returns `AppError::Db` if the query fails.
pub async fn recycle_table(db: &Database, project_id: &str) -> Result<Vec<RecycleTableRow>> {
    let mut conn = db.acquire().await?;

    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT r.item_id, i.text
         FROM recycle_entry r
         JOIN item i ON i.id = r.item_id
         WHERE i.project_id = ?1
         ORDER BY r.recycled_at ASC",
    )
    .bind(project_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(item_id, text)| RecycleTableRow { item_id, text })
        .collect())
}

/// A coder's labeling history for a project.
///
/// Editable rows are the coder's live non-skip records; resolved
/// reliability items the coder voted on appear read-only. Items the
/// coder both labeled and voted on are listed once, as editable.
///
/// # Errors
///
/// Returns `AppError::Db` if any query fails.
pub async fn label_history(
    db: &Database,
    project_id: &str,
    coder: &str,
) -> Result<Vec<HistoryRow>> {
    let mut conn = db.acquire().await?;

    let editable: Vec<(String, String, String, String, String, String, i64)> = sqlx::query_as(
        "SELECT i.id, i.text, l.name, l.id, lr.reason, lr.created_at, i.sensitive_flag
         FROM labeling_record lr
         JOIN item i ON i.id = lr.item_id
         JOIN label l ON l.id = lr.label_id
         WHERE lr.coder = ?1 AND i.project_id = ?2 AND lr.was_skipped = 0
           AND NOT (i.reliability_flag = 0
                    AND EXISTS (SELECT 1 FROM reliability_vote rv WHERE rv.item_id = i.id))
         ORDER BY lr.created_at ASC",
    )
    .bind(coder)
    .bind(project_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut seen: Vec<String> = Vec::with_capacity(editable.len());
    let mut history = Vec::with_capacity(editable.len());
    for (item_id, text, label, label_id, reason, labeled_at, sensitive) in editable {
        seen.push(item_id.clone());
        history.push(HistoryRow {
            item_id,
            text,
            label,
            label_id,
            reason,
            labeled_at,
            editable: true,
            sensitive: sensitive != 0,
        });
    }

    let voted: Vec<(String, String, String, String, String, String, i64)> = sqlx::query_as(
        "SELECT i.id, i.text, l.name, l.id, rv.reason, rv.created_at, i.sensitive_flag
         FROM reliability_vote rv
         JOIN item i ON i.id = rv.item_id
         JOIN label l ON l.id = rv.label_id
         WHERE rv.coder = ?1 AND i.project_id = ?2 AND rv.label_id IS NOT NULL
         ORDER BY rv.created_at ASC",
    )
    .bind(coder)
    .bind(project_id)
    .fetch_all(&mut *conn)
    .await?;

    for (item_id, text, label, label_id, reason, labeled_at, sensitive) in voted {
        if seen.contains(&item_id) {
            continue;
        }
        history.push(HistoryRow {
            item_id,
            text,
            label,
            label_id,
            reason,
            labeled_at,
            editable: false,
            sensitive: sensitive != 0,
        });
    }
    Ok(history)
}

/// Per-coder label usage for a project. Empty when nothing has been
/// labeled yet.
///
/// # Errors
///
/// Returns `AppError::Db` if the query fails.
pub async fn label_distribution(db: &Database, project_id: &str) -> Result<Vec<CoderDistribution>> {
    let mut conn = db.acquire().await?;

    let rows: Vec<(String, String, i64)> = sqlx::query_as(
        "SELECT lr.coder, l.name, COUNT(*)
         FROM labeling_record lr
         JOIN label l ON l.id = lr.label_id
         JOIN item i ON i.id = lr.item_id
         WHERE i.project_id = ?1 AND lr.was_skipped = 0
         GROUP BY lr.coder, l.name
         ORDER BY lr.coder ASC, l.name ASC",
    )
    .bind(project_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut distribution: Vec<CoderDistribution> = Vec::new();
    for (coder, label, count) in rows {
        match distribution.last_mut() {
            Some(entry) if entry.coder == coder => entry.counts.push(LabelCount { label, count }),
            _ => distribution.push(CoderDistribution {
                coder,
                counts: vec![LabelCount { label, count }],
            }),
        }
    }
    Ok(distribution)
}

/// Items not yet labeled, queued, or recycled.
///
/// # Errors
///
/// Returns `AppError::Db` if the query fails.
pub async fn unlabeled_items(db: &Database, project_id: &str) -> Result<Vec<Item>> {
    let mut conn = db.acquire().await?;
    unlabeled_items_conn(&mut conn, project_id).await
}

async fn unlabeled_items_conn(conn: &mut SqliteConnection, project_id: &str) -> Result<Vec<Item>> {
    let rows: Vec<item_repo::ItemRow> = sqlx::query_as(
        "SELECT i.* FROM item i
         WHERE i.project_id = ?1
           AND i.state NOT IN ('admin_queued', 'recycled')
           AND NOT EXISTS (SELECT 1 FROM labeling_record lr WHERE lr.item_id = i.id)
         ORDER BY i.text ASC",
    )
    .bind(project_id)
    .fetch_all(&mut *conn)
    .await?;
    rows.into_iter().map(item_repo::ItemRow::into_item).collect()
}
