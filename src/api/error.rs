//! HTTP mapping for application errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::AppError;

impl IntoResponse for AppError {
    /// `NotFound` is a transport-level failure; `PermissionDenied` is a
    /// domain-level `{"error": ...}` payload on a 200, by collaborator
    /// convention. Everything else is an opaque 500.
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            Self::PermissionDenied(msg) => {
                (StatusCode::OK, Json(json!({ "error": msg }))).into_response()
            }
            other => {
                error!(err = %other, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal error" })),
                )
                    .into_response()
            }
        }
    }
}
