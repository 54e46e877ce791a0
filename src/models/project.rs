//! Project model: labeling configuration shared by all of its items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A labeling project grouping items, labels, and workflow settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Project {
    /// Unique record identifier.
    pub id: String,
    /// Human-readable project name.
    pub name: String,
    /// Number of items handed out per batch fetch.
    pub batch_size: u32,
    /// Number of independent voters required to resolve a reliability item.
    pub required_irr_voters: u32,
    /// Training-set generation stamped onto new labeling records.
    pub current_training_set: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Construct a new project with a generated identifier.
    #[must_use]
    pub fn new(name: String, batch_size: u32, required_irr_voters: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            batch_size,
            required_irr_voters,
            current_training_set: 0,
            created_at: Utc::now(),
        }
    }
}
