use axum::routing::{get, patch, post};
use axum::{Json, Router, extract::State, http::StatusCode};
use tracing::info;

use super::require;
use crate::auth::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::db::users;
use crate::error::AppError;
use crate::models::{
    AuthResponse, LoginRequest, SignupRequest, UpdateFolderRequest, User, UserProfile,
};
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/user", get(current_user))
        .route("/api/auth/update-folder", patch(update_folder))
}

fn auth_response(state: &AppState, user: &User) -> Result<AuthResponse, AppError> {
    let token = state.tokens.issue(&user.id, &user.folder_id)?;
    Ok(AuthResponse {
        token,
        user: UserProfile::from(user),
    })
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    require(&req.username, "Username is required")?;
    require(&req.email, "Email is required")?;
    require(&req.password, "Password is required")?;
    require(&req.folder_id, "Folder ID is required")?;

    let username = req.username.trim();
    let email = req.email.trim();

    if users::find_by_email_or_username(&state.db, email, username)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("User already exists".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = users::insert_user(&state.db, username, email, &password_hash, req.folder_id.trim())
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                AppError::BadRequest("User already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

    info!("user {} signed up", user.id);
    Ok((StatusCode::CREATED, Json(auth_response(&state, &user)?)))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let user = users::find_by_email(&state.db, req.email.trim())
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&req.password, &user.password_hash) {
        return Err(invalid());
    }

    Ok(Json(auth_response(&state, &user)?))
}

async fn current_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let user = users::find_by_id(&state.db, &user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserProfile::from(&user)))
}

/// Changing the folder re-issues the token, since the token carries it.
async fn update_folder(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UpdateFolderRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    require(&req.folder_id, "Folder ID is required")?;

    let user = users::update_folder(&state.db, &user.user_id, req.folder_id.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    info!("user {} moved to folder {}", user.id, user.folder_id);
    Ok(Json(auth_response(&state, &user)?))
}
