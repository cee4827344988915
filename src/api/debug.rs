use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router, extract::State, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::auth::AuthUser;
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new().route("/api/debug/sheets-status", get(sheets_status))
}

/// Exercises the mirror against the caller's folder.
async fn sheets_status(State(state): State<AppState>, user: AuthUser) -> Response {
    match state.mirror.status(&user.folder_id).await {
        Ok(report) => Json(json!({
            "status": "success",
            "message": "Google Sheets service is working",
            "details": report,
        }))
        .into_response(),
        Err(e) => {
            error!("sheets status check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": "Error testing Google Sheets service",
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
