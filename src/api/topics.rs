use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router, extract::State, http::StatusCode};
use serde::Serialize;

use super::require;
use crate::auth::AuthUser;
use crate::db::entries;
use crate::error::AppError;
use crate::models::{NewEntryRequest, NewTopicRequest};
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/topics", get(list_topics).post(create_topic))
        .route("/api/topics/{topic}/subtopics", get(list_subtopics))
}

#[derive(Debug, Serialize)]
struct TopicResponse {
    topic: String,
}

async fn list_topics(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<String>>, AppError> {
    let topics = entries::fetch_topics(&state.db, &user.user_id).await?;
    Ok(Json(topics))
}

/// Topics only exist through entries, so a new topic gets a placeholder entry.
async fn create_topic(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<NewTopicRequest>,
) -> Result<(StatusCode, Json<TopicResponse>), AppError> {
    require(&req.topic, "Topic name is required")?;
    let topic = req.topic.trim().to_string();

    let placeholder = NewEntryRequest {
        topic: topic.clone(),
        title: "Topic Created".to_string(),
        description: "Initial topic creation".to_string(),
        ..Default::default()
    };
    entries::insert_entry(&state.db, &user.user_id, placeholder, None).await?;

    Ok((StatusCode::CREATED, Json(TopicResponse { topic })))
}

async fn list_subtopics(
    State(state): State<AppState>,
    user: AuthUser,
    Path(topic): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    let subtopics = entries::fetch_subtopics(&state.db, &user.user_id, &topic).await?;
    Ok(Json(subtopics))
}
