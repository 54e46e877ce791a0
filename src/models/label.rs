//! Label model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A label a coder can apply to an item. Immutable once in use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Label {
    /// Unique record identifier.
    pub id: String,
    /// Owning project identifier.
    pub project_id: String,
    /// Display name.
    pub name: String,
}

impl Label {
    /// Construct a new label with a generated identifier.
    #[must_use]
    pub fn new(project_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id,
            name,
        }
    }
}
