//! Labeling record model: one coder's label (or skip) on one item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single labeling decision persisted against an item.
///
/// Multiple records may exist per item only in pre-resolution states;
/// non-reliability items normally carry exactly one active record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LabelingRecord {
    /// Unique record identifier.
    pub id: String,
    /// Labeled item identifier.
    pub item_id: String,
    /// Applied label identifier.
    pub label_id: String,
    /// Coder who produced the record.
    pub coder: String,
    /// Training-set generation at record time.
    pub training_set: u32,
    /// Milliseconds the coder spent; `None` for admin labels.
    pub time_to_label_ms: Option<i64>,
    /// Whether the coder skipped rather than labeled.
    pub was_skipped: bool,
    /// Free-text justification supplied by the coder.
    pub reason: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl LabelingRecord {
    /// Construct a new record with a generated identifier.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        item_id: String,
        label_id: String,
        coder: String,
        training_set: u32,
        time_to_label_ms: Option<i64>,
        was_skipped: bool,
        reason: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item_id,
            label_id,
            coder,
            training_set,
            time_to_label_ms,
            was_skipped,
            reason,
            created_at: Utc::now(),
        }
    }
}
