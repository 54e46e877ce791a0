//! Recycle bin model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Soft-delete marker removing an item from the active workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RecycleEntry {
    /// Recycled item identifier.
    pub item_id: String,
    /// Soft-delete timestamp.
    pub recycled_at: DateTime<Utc>,
}
