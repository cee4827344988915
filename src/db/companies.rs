use sqlx::SqlitePool;
use sqlx::types::Json;
use uuid::Uuid;

use super::now_timestamp;
use crate::models::company::with_ids;
use crate::models::{NewCompanyRequest, TargetCompany};

const COMPANY_COLUMNS: &str = r#"
    id, user_id, name, status, priority, notes, tips, target_date,
    interview_experiences, questions, created_at, updated_at
"#;

pub async fn fetch_companies(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<TargetCompany>, sqlx::Error> {
    let sql = format!(
        "SELECT {COMPANY_COLUMNS} FROM target_companies
         WHERE user_id = ?
         ORDER BY updated_at DESC, rowid DESC"
    );
    sqlx::query_as::<_, TargetCompany>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
}

pub async fn fetch_company(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<TargetCompany>, sqlx::Error> {
    let sql = format!("SELECT {COMPANY_COLUMNS} FROM target_companies WHERE id = ? AND user_id = ?");
    sqlx::query_as::<_, TargetCompany>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

pub async fn insert_company(
    db: &SqlitePool,
    user_id: &str,
    req: NewCompanyRequest,
) -> Result<TargetCompany, sqlx::Error> {
    let now = now_timestamp();
    let company = TargetCompany {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: req.name,
        status: req.status.unwrap_or_default(),
        priority: req.priority.unwrap_or_default(),
        notes: req.notes.unwrap_or_default(),
        tips: req.tips.unwrap_or_default(),
        target_date: req.target_date.filter(|d| !d.is_empty()),
        interview_experiences: with_ids(req.interview_experiences),
        questions: with_ids(req.questions),
        created_at: now.clone(),
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO target_companies
            (id, user_id, name, status, priority, notes, tips, target_date,
            interview_experiences, questions, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&company.id)
    .bind(&company.user_id)
    .bind(&company.name)
    .bind(company.status)
    .bind(company.priority)
    .bind(&company.notes)
    .bind(&company.tips)
    .bind(&company.target_date)
    .bind(Json(&company.interview_experiences))
    .bind(Json(&company.questions))
    .bind(&company.created_at)
    .bind(&company.updated_at)
    .execute(db)
    .await?;

    Ok(company)
}

/// Writes every mutable column of a loaded company back and bumps `updated_at`.
pub async fn save_company(db: &SqlitePool, company: &mut TargetCompany) -> Result<(), sqlx::Error> {
    company.updated_at = now_timestamp();

    sqlx::query(
        r#"
        UPDATE target_companies
        SET name = ?1, status = ?2, priority = ?3, notes = ?4, tips = ?5, target_date = ?6,
            interview_experiences = ?7, questions = ?8, updated_at = ?9
        WHERE id = ?10 AND user_id = ?11
        "#,
    )
    .bind(&company.name)
    .bind(company.status)
    .bind(company.priority)
    .bind(&company.notes)
    .bind(&company.tips)
    .bind(&company.target_date)
    .bind(Json(&company.interview_experiences))
    .bind(Json(&company.questions))
    .bind(&company.updated_at)
    .bind(&company.id)
    .bind(&company.user_id)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn delete_company(db: &SqlitePool, user_id: &str, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM target_companies WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
