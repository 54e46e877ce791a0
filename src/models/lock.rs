//! Admin review lock model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single-admin mutual-exclusion token for the admin review view.
///
/// Presence-only, not lease-based: entering creates the row only if
/// absent, leaving deletes the caller's own row. A session that ends
/// without leaving keeps the lock until someone explicitly releases it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AdminLock {
    /// Locked project identifier; at most one live row per project.
    pub project_id: String,
    /// Owning admin coder.
    pub coder: String,
    /// Acquisition timestamp.
    pub locked_at: DateTime<Utc>,
}
