use axum::extract::{Path, Query};
use axum::routing::get;
use axum::{Json, Router, extract::State, http::StatusCode};
use tracing::info;

use super::{MessageResponse, require};
use crate::auth::AuthUser;
use crate::db::entries;
use crate::error::AppError;
use crate::models::entry::normalize_subtopics;
use crate::models::{Entry, NewEntryRequest, SearchParams, UpdateEntryRequest};
use crate::sheets::MirrorRow;
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/entries", get(list_entries).post(create_entry))
        .route("/api/entries/search", get(search_entries))
        .route("/api/entries/topic/{topic}", get(list_by_topic))
        .route(
            "/api/entries/topic/{topic}/subtopic/{subtopic}",
            get(list_by_subtopic),
        )
        .route(
            "/api/entries/{id}",
            get(get_entry).patch(update_entry).delete(delete_entry),
        )
}

async fn list_entries(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Entry>>, AppError> {
    let entries = entries::fetch_entries(&state.db, &user.user_id).await?;
    Ok(Json(entries))
}

/// Mirrors first so the row index can be stored with the record; a failed
/// mirror write leaves the index empty and the entry is saved regardless.
async fn create_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut req): Json<NewEntryRequest>,
) -> Result<(StatusCode, Json<Entry>), AppError> {
    require(
        &user.folder_id,
        "Folder ID is required. Please update your folder ID in settings.",
    )?;
    require(&req.topic, "Topic is required")?;
    require(&req.title, "Title is required")?;

    req.topic = req.topic.trim().to_string();
    req.subtopics = normalize_subtopics(req.subtopics);

    let row_index = state
        .mirror
        .record_created(&user.folder_id, &MirrorRow::from(&req))
        .await;
    let entry = entries::insert_entry(&state.db, &user.user_id, req, row_index).await?;

    info!("created entry {} in topic {}", entry.id, entry.topic);
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn search_entries(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Entry>>, AppError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let entries = entries::search_entries(&state.db, &user.user_id, query).await?;
    Ok(Json(entries))
}

async fn list_by_topic(
    State(state): State<AppState>,
    user: AuthUser,
    Path(topic): Path<String>,
) -> Result<Json<Vec<Entry>>, AppError> {
    let entries = entries::fetch_entries_by_topic(&state.db, &user.user_id, &topic).await?;
    Ok(Json(entries))
}

async fn list_by_subtopic(
    State(state): State<AppState>,
    user: AuthUser,
    Path((topic, subtopic)): Path<(String, String)>,
) -> Result<Json<Vec<Entry>>, AppError> {
    let entries =
        entries::fetch_entries_by_subtopic(&state.db, &user.user_id, &topic, &subtopic).await?;
    Ok(Json(entries))
}

async fn get_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Entry>, AppError> {
    let entry = entries::fetch_entry(&state.db, &user.user_id, &id)
        .await?
        .ok_or_else(entry_not_found)?;
    Ok(Json(entry))
}

async fn update_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<Json<Entry>, AppError> {
    let mut entry = entries::fetch_entry(&state.db, &user.user_id, &id)
        .await?
        .ok_or_else(entry_not_found)?;

    if let Some(is_starred) = req.is_starred {
        entry.is_starred = is_starred;
    }
    if let Some(is_basic) = req.is_basic {
        entry.is_basic = is_basic;
    }
    if let Some(subtopics) = req.subtopics {
        entry.subtopics = normalize_subtopics(subtopics);
    }

    entries::save_entry_flags(&state.db, &mut entry).await?;
    state.mirror.record_updated(&user.folder_id, &entry).await;

    Ok(Json(entry))
}

async fn delete_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let entry = entries::fetch_entry(&state.db, &user.user_id, &id)
        .await?
        .ok_or_else(entry_not_found)?;

    state.mirror.record_deleted(&user.folder_id, &entry).await;

    if !entries::delete_entry(&state.db, &user.user_id, &entry.id).await? {
        return Err(entry_not_found());
    }

    info!("deleted entry {}", entry.id);
    Ok(Json(MessageResponse::new("Entry deleted successfully")))
}

fn entry_not_found() -> AppError {
    AppError::NotFound("Entry not found".to_string())
}
