use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Json, Router, extract::State, http::StatusCode};

use super::{MessageResponse, require};
use crate::auth::AuthUser;
use crate::db::references;
use crate::error::AppError;
use crate::models::{NewReferenceRequest, ReferenceMaterial, UpdateReferenceRequest};
use crate::state::AppState;

/// `GET /api/reference/{key}` lists by topic while `PUT`/`DELETE` address a
/// single material by id; both share one route pattern.
pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/reference", post(create_reference))
        .route(
            "/api/reference/{key}",
            get(list_by_topic)
                .put(update_reference)
                .delete(delete_reference),
        )
}

fn reference_not_found() -> AppError {
    AppError::NotFound("Reference material not found".to_string())
}

async fn list_by_topic(
    State(state): State<AppState>,
    user: AuthUser,
    Path(topic): Path<String>,
) -> Result<Json<Vec<ReferenceMaterial>>, AppError> {
    let materials = references::fetch_by_topic(&state.db, &user.user_id, &topic).await?;
    Ok(Json(materials))
}

async fn create_reference(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<NewReferenceRequest>,
) -> Result<(StatusCode, Json<ReferenceMaterial>), AppError> {
    if req.topic.trim().is_empty() || req.title.trim().is_empty() || req.content.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "Topic, title, and content are required".to_string(),
        ));
    }

    let material = references::insert_reference(&state.db, &user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

async fn update_reference(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateReferenceRequest>,
) -> Result<Json<ReferenceMaterial>, AppError> {
    let mut material = references::fetch_reference(&state.db, &user.user_id, &id)
        .await?
        .ok_or_else(reference_not_found)?;

    if let Some(title) = req.title {
        require(&title, "Title cannot be empty")?;
        material.title = title;
    }
    if let Some(content) = req.content {
        require(&content, "Content cannot be empty")?;
        material.content = content;
    }
    if let Some(url) = req.url {
        material.url = url;
    }

    references::save_reference(&state.db, &mut material).await?;
    Ok(Json(material))
}

async fn delete_reference(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !references::delete_reference(&state.db, &user.user_id, &id).await? {
        return Err(reference_not_found());
    }
    Ok(Json(MessageResponse::new("Reference material removed")))
}
