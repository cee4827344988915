use sqlx::SqlitePool;
use uuid::Uuid;

use super::now_timestamp;
use crate::models::{NewReferenceRequest, ReferenceMaterial};

pub async fn fetch_by_topic(
    db: &SqlitePool,
    user_id: &str,
    topic: &str,
) -> Result<Vec<ReferenceMaterial>, sqlx::Error> {
    sqlx::query_as::<_, ReferenceMaterial>(
        r#"
        SELECT id, user_id, topic, title, content, url, created_at, updated_at
        FROM reference_materials
        WHERE user_id = ? AND topic = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .bind(topic)
    .fetch_all(db)
    .await
}

pub async fn fetch_reference(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<ReferenceMaterial>, sqlx::Error> {
    sqlx::query_as::<_, ReferenceMaterial>(
        r#"
        SELECT id, user_id, topic, title, content, url, created_at, updated_at
        FROM reference_materials
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn insert_reference(
    db: &SqlitePool,
    user_id: &str,
    req: NewReferenceRequest,
) -> Result<ReferenceMaterial, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now_timestamp();
    let url = req.url.unwrap_or_default();

    sqlx::query(
        r#"
        INSERT INTO reference_materials
            (id, user_id, topic, title, content, url, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.topic)
    .bind(&req.title)
    .bind(&req.content)
    .bind(&url)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(ReferenceMaterial {
        id,
        user_id: user_id.to_string(),
        topic: req.topic,
        title: req.title,
        content: req.content,
        url,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn save_reference(
    db: &SqlitePool,
    reference: &mut ReferenceMaterial,
) -> Result<(), sqlx::Error> {
    reference.updated_at = now_timestamp();

    sqlx::query(
        r#"
        UPDATE reference_materials
        SET title = ?1, content = ?2, url = ?3, updated_at = ?4
        WHERE id = ?5 AND user_id = ?6
        "#,
    )
    .bind(&reference.title)
    .bind(&reference.content)
    .bind(&reference.url)
    .bind(&reference.updated_at)
    .bind(&reference.id)
    .bind(&reference.user_id)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn delete_reference(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reference_materials WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
