use axum::extract::Path;
use axum::routing::{get, post, put};
use axum::{Json, Router, extract::State, http::StatusCode};
use uuid::Uuid;

use super::{MessageResponse, require};
use crate::auth::AuthUser;
use crate::db::companies;
use crate::error::AppError;
use crate::models::{
    InterviewExperience, NewCompanyRequest, Question, TargetCompany, UpdateCompanyRequest,
    UpdateInterviewRequest, UpdateQuestionRequest,
};
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/target-companies",
            get(list_companies).post(create_company),
        )
        .route(
            "/api/target-companies/{id}",
            get(get_company).put(update_company).delete(delete_company),
        )
        .route("/api/target-companies/{id}/questions", post(add_question))
        .route(
            "/api/target-companies/{id}/questions/{question_id}",
            put(update_question).delete(delete_question),
        )
        .route("/api/target-companies/{id}/interviews", post(add_interview))
        .route(
            "/api/target-companies/{id}/interviews/{interview_id}",
            put(update_interview).delete(delete_interview),
        )
}

async fn load(state: &AppState, user: &AuthUser, id: &str) -> Result<TargetCompany, AppError> {
    companies::fetch_company(&state.db, &user.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Target company not found".to_string()))
}

async fn list_companies(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<TargetCompany>>, AppError> {
    let companies = companies::fetch_companies(&state.db, &user.user_id).await?;
    Ok(Json(companies))
}

async fn get_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TargetCompany>, AppError> {
    Ok(Json(load(&state, &user, &id).await?))
}

async fn create_company(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut req): Json<NewCompanyRequest>,
) -> Result<(StatusCode, Json<TargetCompany>), AppError> {
    require(&req.name, "Company name is required")?;
    req.name = req.name.trim().to_string();

    let company = companies::insert_company(&state.db, &user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

async fn update_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateCompanyRequest>,
) -> Result<Json<TargetCompany>, AppError> {
    if let Some(name) = &req.name {
        require(name, "Company name is required")?;
    }
    let mut company = load(&state, &user, &id).await?;
    company.apply(req);
    companies::save_company(&state.db, &mut company).await?;
    Ok(Json(company))
}

async fn delete_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !companies::delete_company(&state.db, &user.user_id, &id).await? {
        return Err(AppError::NotFound("Target company not found".to_string()));
    }
    Ok(Json(MessageResponse::new("Target company removed")))
}

async fn add_question(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(mut question): Json<Question>,
) -> Result<Json<TargetCompany>, AppError> {
    require(&question.name, "Question name is required")?;
    let mut company = load(&state, &user, &id).await?;

    question.id = Uuid::new_v4().to_string();
    company.questions.push(question);
    companies::save_company(&state.db, &mut company).await?;
    Ok(Json(company))
}

async fn update_question(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, question_id)): Path<(String, String)>,
    Json(req): Json<UpdateQuestionRequest>,
) -> Result<Json<TargetCompany>, AppError> {
    let mut company = load(&state, &user, &id).await?;
    let question = company
        .questions
        .iter_mut()
        .find(|q| q.id == question_id)
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
    question.apply(req);

    companies::save_company(&state.db, &mut company).await?;
    Ok(Json(company))
}

async fn delete_question(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, question_id)): Path<(String, String)>,
) -> Result<Json<TargetCompany>, AppError> {
    let mut company = load(&state, &user, &id).await?;
    let before = company.questions.len();
    company.questions.retain(|q| q.id != question_id);
    if company.questions.len() == before {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    companies::save_company(&state.db, &mut company).await?;
    Ok(Json(company))
}

async fn add_interview(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(mut experience): Json<InterviewExperience>,
) -> Result<Json<TargetCompany>, AppError> {
    let mut company = load(&state, &user, &id).await?;

    experience.id = Uuid::new_v4().to_string();
    company.interview_experiences.push(experience);
    companies::save_company(&state.db, &mut company).await?;
    Ok(Json(company))
}

async fn update_interview(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, interview_id)): Path<(String, String)>,
    Json(req): Json<UpdateInterviewRequest>,
) -> Result<Json<TargetCompany>, AppError> {
    let mut company = load(&state, &user, &id).await?;
    let experience = company
        .interview_experiences
        .iter_mut()
        .find(|e| e.id == interview_id)
        .ok_or_else(|| AppError::NotFound("Interview experience not found".to_string()))?;
    experience.apply(req);

    companies::save_company(&state.db, &mut company).await?;
    Ok(Json(company))
}

async fn delete_interview(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, interview_id)): Path<(String, String)>,
) -> Result<Json<TargetCompany>, AppError> {
    let mut company = load(&state, &user, &id).await?;
    let before = company.interview_experiences.len();
    company.interview_experiences.retain(|e| e.id != interview_id);
    if company.interview_experiences.len() == before {
        return Err(AppError::NotFound(
            "Interview experience not found".to_string(),
        ));
    }

    companies::save_company(&state.db, &mut company).await?;
    Ok(Json(company))
}
