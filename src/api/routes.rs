//! Route definitions for the annotation workflow API.

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::state::AppState;

/// Full application router.
///
/// ```text
/// GET  /projects/{project_id}/deck              get_deck (?coder, ?count)
/// GET  /projects/{project_id}/history           get_history (?coder)
/// GET  /projects/{project_id}/unlabeled         get_unlabeled (?coder)
/// GET  /projects/{project_id}/distribution      get_distribution (?coder)
/// GET  /projects/{project_id}/recycle           get_recycle_table (?coder)
/// GET  /projects/{project_id}/admin/table       get_admin_table (?coder)
/// GET  /projects/{project_id}/admin/counts      get_admin_counts (?coder)
/// GET  /projects/{project_id}/admin/available   get_admin_availability (?coder)
/// POST /projects/{project_id}/session/enter     post_enter_session
/// POST /projects/{project_id}/session/leave     post_leave_session
/// POST /items/{item_id}/label                   post_label
/// POST /items/{item_id}/skip                    post_skip
/// POST /items/{item_id}/modify                  post_modify
/// POST /items/{item_id}/modify-to-skip          post_modify_to_skip
/// POST /items/{item_id}/admin-label             post_admin_label
/// POST /items/{item_id}/discard                 post_discard
/// POST /items/{item_id}/restore                 post_restore
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects/{project_id}/deck", get(handlers::get_deck))
        .route("/projects/{project_id}/history", get(handlers::get_history))
        .route(
            "/projects/{project_id}/unlabeled",
            get(handlers::get_unlabeled),
        )
        .route(
            "/projects/{project_id}/distribution",
            get(handlers::get_distribution),
        )
        .route(
            "/projects/{project_id}/recycle",
            get(handlers::get_recycle_table),
        )
        .route(
            "/projects/{project_id}/admin/table",
            get(handlers::get_admin_table),
        )
        .route(
            "/projects/{project_id}/admin/counts",
            get(handlers::get_admin_counts),
        )
        .route(
            "/projects/{project_id}/admin/available",
            get(handlers::get_admin_availability),
        )
        .route(
            "/projects/{project_id}/session/enter",
            post(handlers::post_enter_session),
        )
        .route(
            "/projects/{project_id}/session/leave",
            post(handlers::post_leave_session),
        )
        .route("/items/{item_id}/label", post(handlers::post_label))
        .route("/items/{item_id}/skip", post(handlers::post_skip))
        .route("/items/{item_id}/modify", post(handlers::post_modify))
        .route(
            "/items/{item_id}/modify-to-skip",
            post(handlers::post_modify_to_skip),
        )
        .route(
            "/items/{item_id}/admin-label",
            post(handlers::post_admin_label),
        )
        .route("/items/{item_id}/discard", post(handlers::post_discard))
        .route("/items/{item_id}/restore", post(handlers::post_restore))
}
