use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    pub topic: String,
    #[sqlx(json)]
    pub subtopics: Vec<String>,
    pub title: String,
    pub description: String,
    pub problem_link: String,
    pub approach: String,
    pub code: String,
    pub time_complexity: String,
    pub space_complexity: String,
    pub is_starred: bool,
    pub is_basic: bool,
    pub sheet_row_index: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewEntryRequest {
    pub topic: String,
    pub subtopics: Vec<String>,
    pub title: String,
    pub description: String,
    pub problem_link: String,
    pub approach: String,
    pub code: String,
    pub time_complexity: String,
    pub space_complexity: String,
    pub is_basic: bool,
}

/// Only these fields can change after an entry is created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_starred: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_basic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtopics: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTopicRequest {
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

/// Tags are trimmed, blanks dropped, first occurrence wins.
pub fn normalize_subtopics(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtopics_are_trimmed_and_deduplicated() {
        let tags = vec![
            " two pointers ".to_string(),
            "".to_string(),
            "sliding window".to_string(),
            "two pointers".to_string(),
        ];
        assert_eq!(
            normalize_subtopics(tags),
            vec!["two pointers".to_string(), "sliding window".to_string()]
        );
    }

    #[test]
    fn update_request_leaves_absent_fields_unset() {
        let req: UpdateEntryRequest = serde_json::from_str(r#"{"isStarred":true}"#).unwrap();
        assert_eq!(req.is_starred, Some(true));
        assert!(req.is_basic.is_none());
        assert!(req.subtopics.is_none());
    }
}
