//! Reliability vote model: one entry in the append-only IRR log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One coder's reliability vote on one item.
///
/// A `None` label is a skip vote. The log is append-only; one entry per
/// (item, coder) pair under normal operation, duplicates tolerated
/// defensively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReliabilityVote {
    /// Unique record identifier.
    pub id: String,
    /// Voted item identifier.
    pub item_id: String,
    /// Voting coder.
    pub coder: String,
    /// Chosen label, or `None` for a skip vote.
    pub label_id: Option<String>,
    /// Free-text justification supplied with the vote.
    pub reason: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ReliabilityVote {
    /// Construct a new vote with a generated identifier.
    #[must_use]
    pub fn new(item_id: String, coder: String, label_id: Option<String>, reason: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item_id,
            coder,
            label_id,
            reason,
            created_at: Utc::now(),
        }
    }

    /// Whether this vote is a skip.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        self.label_id.is_none()
    }
}
