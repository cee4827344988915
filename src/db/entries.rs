use sqlx::SqlitePool;
use sqlx::types::Json;
use uuid::Uuid;

use super::now_timestamp;
use crate::models::{Entry, NewEntryRequest};

const ENTRY_COLUMNS: &str = r#"
    id, user_id, topic, subtopics, title, description, problem_link, approach, code,
    time_complexity, space_complexity, is_starred, is_basic, sheet_row_index,
    created_at, updated_at
"#;

pub async fn insert_entry(
    db: &SqlitePool,
    user_id: &str,
    req: NewEntryRequest,
    sheet_row_index: Option<i64>,
) -> Result<Entry, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now_timestamp();

    sqlx::query(
        r#"
        INSERT INTO entries
            (id, user_id, topic, subtopics, title, description, problem_link, approach, code,
            time_complexity, space_complexity, is_starred, is_basic, sheet_row_index,
            created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, ?12, ?13, ?14, ?14)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.topic)
    .bind(Json(&req.subtopics))
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.problem_link)
    .bind(&req.approach)
    .bind(&req.code)
    .bind(&req.time_complexity)
    .bind(&req.space_complexity)
    .bind(req.is_basic)
    .bind(sheet_row_index)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Entry {
        id,
        user_id: user_id.to_string(),
        topic: req.topic,
        subtopics: req.subtopics,
        title: req.title,
        description: req.description,
        problem_link: req.problem_link,
        approach: req.approach,
        code: req.code,
        time_complexity: req.time_complexity,
        space_complexity: req.space_complexity,
        is_starred: false,
        is_basic: req.is_basic,
        sheet_row_index,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn fetch_entries(db: &SqlitePool, user_id: &str) -> Result<Vec<Entry>, sqlx::Error> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = ? ORDER BY created_at DESC, rowid DESC"
    );
    sqlx::query_as::<_, Entry>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
}

pub async fn fetch_entries_by_topic(
    db: &SqlitePool,
    user_id: &str,
    topic: &str,
) -> Result<Vec<Entry>, sqlx::Error> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM entries
         WHERE user_id = ? AND topic = ?
         ORDER BY created_at DESC, rowid DESC"
    );
    sqlx::query_as::<_, Entry>(&sql)
        .bind(user_id)
        .bind(topic)
        .fetch_all(db)
        .await
}

pub async fn fetch_entries_by_subtopic(
    db: &SqlitePool,
    user_id: &str,
    topic: &str,
    subtopic: &str,
) -> Result<Vec<Entry>, sqlx::Error> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM entries
         WHERE user_id = ? AND topic = ?
           AND EXISTS (SELECT 1 FROM json_each(entries.subtopics) WHERE json_each.value = ?)
         ORDER BY created_at DESC, rowid DESC"
    );
    sqlx::query_as::<_, Entry>(&sql)
        .bind(user_id)
        .bind(topic)
        .bind(subtopic)
        .fetch_all(db)
        .await
}

/// Case-insensitive substring match on title, description and topic.
pub async fn search_entries(
    db: &SqlitePool,
    user_id: &str,
    query: &str,
) -> Result<Vec<Entry>, sqlx::Error> {
    let pattern = like_pattern(query);
    let sql = format!(
        r#"SELECT {ENTRY_COLUMNS} FROM entries
         WHERE user_id = ?1
           AND (title LIKE ?2 ESCAPE '\'
                OR description LIKE ?2 ESCAPE '\'
                OR topic LIKE ?2 ESCAPE '\')
         ORDER BY created_at DESC, rowid DESC"#
    );
    sqlx::query_as::<_, Entry>(&sql)
        .bind(user_id)
        .bind(pattern)
        .fetch_all(db)
        .await
}

pub async fn fetch_entry(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<Entry>, sqlx::Error> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ? AND user_id = ?");
    sqlx::query_as::<_, Entry>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

/// Persists the mutable fields of an already-loaded entry.
pub async fn save_entry_flags(db: &SqlitePool, entry: &mut Entry) -> Result<(), sqlx::Error> {
    entry.updated_at = now_timestamp();

    sqlx::query(
        r#"
        UPDATE entries
        SET is_starred = ?1, is_basic = ?2, subtopics = ?3, updated_at = ?4
        WHERE id = ?5 AND user_id = ?6
        "#,
    )
    .bind(entry.is_starred)
    .bind(entry.is_basic)
    .bind(Json(&entry.subtopics))
    .bind(&entry.updated_at)
    .bind(&entry.id)
    .bind(&entry.user_id)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn delete_entry(db: &SqlitePool, user_id: &str, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM entries WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_topics(db: &SqlitePool, user_id: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT topic FROM entries WHERE user_id = ? ORDER BY topic",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn fetch_subtopics(
    db: &SqlitePool,
    user_id: &str,
    topic: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT CAST(tag.value AS TEXT) AS subtopic
        FROM entries, json_each(entries.subtopics) AS tag
        WHERE entries.user_id = ? AND entries.topic = ?
        ORDER BY subtopic
        "#,
    )
    .bind(user_id)
    .bind(topic)
    .fetch_all(db)
    .await
}

fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern("tree"), "%tree%");
    }
}
