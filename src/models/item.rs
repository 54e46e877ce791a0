//! Work item model and lifecycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a work item.
///
/// Stored as an explicit tag on the item row and maintained
/// transactionally alongside the membership stores, so the
/// mutual-exclusion invariant (a recycled item never holds an active
/// assignment or queue membership) is checkable in one place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// In no queue, unassigned, not recycled; candidate for distribution.
    Available,
    /// Checked out by exactly one coder.
    Assigned,
    /// Awaiting an administrator decision.
    AdminQueued,
    /// Soft-deleted; terminal but reversible via restore.
    Recycled,
}

/// Reason an item entered the admin queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueReason {
    /// Reliability voting escalated the item (skip vote or disagreement).
    Irr,
    /// A coder skipped the item on the normal path.
    Skipped,
    /// A coder or admin flagged the content as sensitive.
    Explicit,
}

/// A unit of labeling work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Item {
    /// Unique record identifier.
    pub id: String,
    /// Owning project identifier.
    pub project_id: String,
    /// Immutable text payload presented to coders.
    pub text: String,
    /// Whether the item is subject to multi-rater reliability checking.
    pub reliability_flag: bool,
    /// Whether the content has been marked sensitive.
    pub sensitive_flag: bool,
    /// Current lifecycle state.
    pub state: ItemState,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Construct a new available item with a generated identifier.
    #[must_use]
    pub fn new(project_id: String, text: String, reliability_flag: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id,
            text,
            reliability_flag,
            sensitive_flag: false,
            state: ItemState::Available,
            created_at: Utc::now(),
        }
    }
}
