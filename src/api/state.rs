//! Shared application state for the HTTP layer.

use std::sync::Arc;

use crate::config::GlobalConfig;
use crate::persistence::db::Database;
use crate::workflow::coordinator::WorkflowCoordinator;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Parsed global configuration (permission oracle included).
    pub config: Arc<GlobalConfig>,
    /// Shared database pool for read-only report queries.
    pub db: Arc<Database>,
    /// Workflow coordinator executing the public operations.
    pub coordinator: WorkflowCoordinator,
}
