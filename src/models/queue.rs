//! Queue membership model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::QueueReason;

/// Named queue an item can be a member of.
///
/// Only the admin queue exists today; the available pool is implicit
/// (an item in no queue, unassigned and not recycled).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueType {
    /// Items awaiting administrator adjudication.
    Admin,
}

/// Membership of one item in one named queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct QueueEntry {
    /// Member item identifier.
    pub item_id: String,
    /// Queue the item belongs to.
    pub queue_type: QueueType,
    /// Owning project identifier.
    pub project_id: String,
    /// Why the item was enqueued.
    pub reason: QueueReason,
    /// Enqueue timestamp.
    pub queued_at: DateTime<Utc>,
}
