//! Label change audit model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable record of a label correction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ChangeLogEntry {
    /// Unique record identifier.
    pub id: String,
    /// Owning project identifier.
    pub project_id: String,
    /// Affected item identifier.
    pub item_id: String,
    /// Coder who made the correction.
    pub coder: String,
    /// Label name before the change.
    pub old_label_name: String,
    /// Label name after the change (`"skip"` for skip conversions).
    pub new_label_name: String,
    /// Change timestamp.
    pub changed_at: DateTime<Utc>,
}

impl ChangeLogEntry {
    /// Construct a new entry with a generated identifier.
    #[must_use]
    pub fn new(
        project_id: String,
        item_id: String,
        coder: String,
        old_label_name: String,
        new_label_name: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id,
            item_id,
            coder,
            old_label_name,
            new_label_name,
            changed_at: Utc::now(),
        }
    }
}
