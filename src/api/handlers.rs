//! Request handlers mapping HTTP calls onto coordinator operations.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::workflow::reports;
use crate::{AppError, Result};

use super::state::AppState;

/* --------------------------------------------------------------------------
   Request shapes
   -------------------------------------------------------------------------- */

/// Query parameters for batch fetch.
#[derive(Debug, Deserialize)]
pub struct DeckQuery {
    /// Requesting coder.
    pub coder: String,
    /// Optional batch-size override.
    pub count: Option<u32>,
}

/// Query parameters carrying only a coder identity.
#[derive(Debug, Deserialize)]
pub struct CoderQuery {
    /// Requesting coder.
    pub coder: String,
}

/// Body carrying only a coder identity.
#[derive(Debug, Deserialize)]
pub struct CoderRequest {
    /// Acting coder.
    pub coder: String,
}

/// Body for label submission.
#[derive(Debug, Deserialize)]
pub struct SubmitLabelRequest {
    /// Acting coder.
    pub coder: String,
    /// Chosen label identifier.
    pub label_id: String,
    /// Milliseconds spent labeling.
    pub labeling_time_ms: i64,
    /// Optional justification text.
    #[serde(default)]
    pub reason: String,
}

/// Body for skip submission.
#[derive(Debug, Deserialize)]
pub struct SubmitSkipRequest {
    /// Acting coder.
    pub coder: String,
    /// Label context the skip was made under.
    pub label_id: String,
    /// Milliseconds spent before skipping.
    pub labeling_time_ms: i64,
    /// Optional justification text.
    #[serde(default)]
    pub reason: String,
    /// Whether the coder flagged the content as sensitive.
    #[serde(default)]
    pub explicit: bool,
}

/// Body for label modification.
#[derive(Debug, Deserialize)]
pub struct ModifyLabelRequest {
    /// Acting coder.
    pub coder: String,
    /// Replacement label identifier.
    pub label_id: String,
    /// Label identifier being replaced.
    pub old_label_id: String,
    /// Optional justification text.
    #[serde(default)]
    pub reason: String,
}

/// Body for converting an existing record into a skip.
#[derive(Debug, Deserialize)]
pub struct ModifyToSkipRequest {
    /// Acting coder.
    pub coder: String,
    /// Replacement label identifier (skip context).
    pub label_id: String,
    /// Label identifier being replaced.
    pub old_label_id: String,
    /// Optional justification text.
    #[serde(default)]
    pub reason: String,
    /// Whether the coder flagged the content as sensitive.
    #[serde(default)]
    pub explicit: bool,
}

/// Body for admin finalization.
#[derive(Debug, Deserialize)]
pub struct AdminLabelRequest {
    /// Acting admin.
    pub coder: String,
    /// Chosen label identifier.
    pub label_id: String,
    /// Optional justification text.
    #[serde(default)]
    pub reason: String,
    /// Sensitive flag value to pin on the item.
    #[serde(default)]
    pub explicit: bool,
}

/* --------------------------------------------------------------------------
   Helpers
   -------------------------------------------------------------------------- */

/// Permission level for a coder acting on an item's project.
async fn level_for_item(state: &AppState, item_id: &str, coder: &str) -> Result<i64> {
    let project_id = state.coordinator.project_of_item(item_id).await?;
    Ok(state.config.permission_level(&project_id, coder))
}

/// Reject non-admin callers with the domain-level error payload.
fn require_admin(level: i64) -> Result<()> {
    if crate::config::denotes_admin(level) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(
            "invalid credentials, must be an admin".into(),
        ))
    }
}

/* --------------------------------------------------------------------------
   Coder handlers
   -------------------------------------------------------------------------- */

/// GET /projects/{project_id}/deck
///
/// Hand a batch of items to the coder along with the project's labels.
pub async fn get_deck(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<DeckQuery>,
) -> Result<impl IntoResponse> {
    let batch = state
        .coordinator
        .fetch_batch(&project_id, &query.coder, query.count)
        .await?;
    Ok(Json(batch))
}

/// GET /projects/{project_id}/history
pub async fn get_history(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<CoderQuery>,
) -> Result<impl IntoResponse> {
    let rows = reports::label_history(&state.db, &project_id, &query.coder).await?;
    Ok(Json(json!({ "data": rows })))
}

/// POST /items/{item_id}/label
pub async fn post_label(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<SubmitLabelRequest>,
) -> Result<impl IntoResponse> {
    state
        .coordinator
        .submit_label(
            &item_id,
            &req.coder,
            &req.label_id,
            req.labeling_time_ms,
            &req.reason,
        )
        .await?;
    Ok(Json(json!({})))
}

/// POST /items/{item_id}/skip
pub async fn post_skip(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<SubmitSkipRequest>,
) -> Result<impl IntoResponse> {
    state
        .coordinator
        .submit_skip(
            &item_id,
            &req.coder,
            &req.label_id,
            req.labeling_time_ms,
            &req.reason,
            req.explicit,
        )
        .await?;
    Ok(Json(json!({})))
}

/// POST /items/{item_id}/modify
pub async fn post_modify(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<ModifyLabelRequest>,
) -> Result<impl IntoResponse> {
    state
        .coordinator
        .modify_label(
            &item_id,
            &req.coder,
            &req.old_label_id,
            &req.label_id,
            &req.reason,
        )
        .await?;
    Ok(Json(json!({})))
}

/// POST /items/{item_id}/modify-to-skip
pub async fn post_modify_to_skip(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<ModifyToSkipRequest>,
) -> Result<impl IntoResponse> {
    state
        .coordinator
        .modify_label_to_skip(
            &item_id,
            &req.coder,
            &req.old_label_id,
            &req.label_id,
            &req.reason,
            req.explicit,
        )
        .await?;
    Ok(Json(json!({})))
}

/* --------------------------------------------------------------------------
   Admin handlers
   -------------------------------------------------------------------------- */

/// POST /items/{item_id}/admin-label
pub async fn post_admin_label(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<AdminLabelRequest>,
) -> Result<impl IntoResponse> {
    require_admin(level_for_item(&state, &item_id, &req.coder).await?)?;
    state
        .coordinator
        .admin_label(&item_id, &req.coder, &req.label_id, &req.reason, req.explicit)
        .await?;
    Ok(Json(json!({})))
}

/// POST /items/{item_id}/discard
pub async fn post_discard(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<CoderRequest>,
) -> Result<impl IntoResponse> {
    let level = level_for_item(&state, &item_id, &req.coder).await?;
    state.coordinator.discard(&item_id, &req.coder, level).await?;
    Ok(Json(json!({})))
}

/// POST /items/{item_id}/restore
pub async fn post_restore(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<CoderRequest>,
) -> Result<impl IntoResponse> {
    let level = level_for_item(&state, &item_id, &req.coder).await?;
    state.coordinator.restore(&item_id, &req.coder, level).await?;
    Ok(Json(json!({})))
}

/// GET /projects/{project_id}/admin/table
pub async fn get_admin_table(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<CoderQuery>,
) -> Result<impl IntoResponse> {
    require_admin(state.config.permission_level(&project_id, &query.coder))?;
    let rows = reports::admin_table(&state.db, &project_id).await?;
    Ok(Json(json!({ "data": rows })))
}

/// GET /projects/{project_id}/admin/counts
pub async fn get_admin_counts(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<CoderQuery>,
) -> Result<impl IntoResponse> {
    require_admin(state.config.permission_level(&project_id, &query.coder))?;
    let counts = reports::admin_counts(&state.db, &project_id).await?;
    Ok(Json(json!({ "data": counts })))
}

/// GET /projects/{project_id}/recycle
pub async fn get_recycle_table(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<CoderQuery>,
) -> Result<impl IntoResponse> {
    require_admin(state.config.permission_level(&project_id, &query.coder))?;
    let rows = reports::recycle_table(&state.db, &project_id).await?;
    Ok(Json(json!({ "data": rows })))
}

/// GET /projects/{project_id}/distribution
pub async fn get_distribution(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<CoderQuery>,
) -> Result<impl IntoResponse> {
    require_admin(state.config.permission_level(&project_id, &query.coder))?;
    let rows = reports::label_distribution(&state.db, &project_id).await?;
    Ok(Json(rows))
}

/// GET /projects/{project_id}/unlabeled
pub async fn get_unlabeled(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<CoderQuery>,
) -> Result<impl IntoResponse> {
    require_admin(state.config.permission_level(&project_id, &query.coder))?;
    let items = reports::unlabeled_items(&state.db, &project_id).await?;
    Ok(Json(json!({ "data": items })))
}

/* --------------------------------------------------------------------------
   Session handlers
   -------------------------------------------------------------------------- */

/// GET /projects/{project_id}/admin/available
pub async fn get_admin_availability(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<CoderQuery>,
) -> Result<impl IntoResponse> {
    let available = state
        .coordinator
        .check_admin_availability(&project_id, &query.coder)
        .await?;
    Ok(Json(json!({ "available": i32::from(available) })))
}

/// POST /projects/{project_id}/session/enter
pub async fn post_enter_session(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(req): Json<CoderRequest>,
) -> Result<impl IntoResponse> {
    let level = state.config.permission_level(&project_id, &req.coder);
    state
        .coordinator
        .enter_session(&project_id, &req.coder, level)
        .await?;
    Ok(Json(json!({})))
}

/// POST /projects/{project_id}/session/leave
pub async fn post_leave_session(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(req): Json<CoderRequest>,
) -> Result<impl IntoResponse> {
    let level = state.config.permission_level(&project_id, &req.coder);
    state
        .coordinator
        .leave_session(&project_id, &req.coder, level)
        .await?;
    Ok(Json(json!({})))
}
