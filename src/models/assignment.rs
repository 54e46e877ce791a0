//! Assignment model: exclusive checkout of an item to a coder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An active checkout of one item by one coder.
///
/// At most one assignment exists per item at any time; a coder may hold
/// many assignments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Assignment {
    /// Checked-out item identifier.
    pub item_id: String,
    /// Holding coder.
    pub coder: String,
    /// Checkout timestamp.
    pub assigned_at: DateTime<Utc>,
}
