use sqlx::SqlitePool;
use uuid::Uuid;

use super::now_timestamp;
use crate::models::User;

pub async fn find_by_email_or_username(
    db: &SqlitePool,
    email: &str,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, folder_id, created_at
        FROM users
        WHERE email = ? OR username = ?
        LIMIT 1
        "#,
    )
    .bind(email)
    .bind(username)
    .fetch_optional(db)
    .await
}

pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, folder_id, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(db)
    .await
}

pub async fn find_by_id(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, folder_id, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_user(
    db: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    folder_id: &str,
) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now_timestamp();

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, folder_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(folder_id)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(User {
        id,
        username: username.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        folder_id: folder_id.to_string(),
        created_at: now,
    })
}

pub async fn update_folder(
    db: &SqlitePool,
    id: &str,
    folder_id: &str,
) -> Result<Option<User>, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET folder_id = ? WHERE id = ?")
        .bind(folder_id)
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_id(db, id).await
}
