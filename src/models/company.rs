use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum CompanyStatus {
    #[default]
    Planning,
    Preparing,
    Applied,
    Interviewing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewOutcome {
    Passed,
    Failed,
    #[default]
    Waiting,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewExperience {
    pub id: String,
    pub date: Option<String>,
    pub round: String,
    pub notes: String,
    pub outcome: InterviewOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Question {
    pub id: String,
    pub name: String,
    pub url: String,
    pub status: QuestionStatus,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TargetCompany {
    pub id: String,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    pub name: String,
    pub status: CompanyStatus,
    pub priority: Priority,
    pub notes: String,
    pub tips: String,
    pub target_date: Option<String>,
    #[sqlx(json)]
    pub interview_experiences: Vec<InterviewExperience>,
    #[sqlx(json)]
    pub questions: Vec<Question>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCompanyRequest {
    pub name: String,
    pub status: Option<CompanyStatus>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
    pub tips: Option<String>,
    pub target_date: Option<String>,
    pub questions: Vec<Question>,
    pub interview_experiences: Vec<InterviewExperience>,
}

/// Fields that are present replace the stored value; absent ones are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCompanyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CompanyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_experiences: Option<Vec<InterviewExperience>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateQuestionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<QuestionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateInterviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<InterviewOutcome>,
}

impl TargetCompany {
    pub fn apply(&mut self, req: UpdateCompanyRequest) {
        if let Some(name) = req.name {
            self.name = name;
        }
        if let Some(status) = req.status {
            self.status = status;
        }
        if let Some(priority) = req.priority {
            self.priority = priority;
        }
        if let Some(notes) = req.notes {
            self.notes = notes;
        }
        if let Some(tips) = req.tips {
            self.tips = tips;
        }
        if let Some(target_date) = req.target_date {
            self.target_date = Some(target_date).filter(|d| !d.is_empty());
        }
        if let Some(questions) = req.questions {
            self.questions = with_ids(questions);
        }
        if let Some(experiences) = req.interview_experiences {
            self.interview_experiences = with_ids(experiences);
        }
    }
}

impl Question {
    pub fn apply(&mut self, req: UpdateQuestionRequest) {
        if let Some(name) = req.name {
            self.name = name;
        }
        if let Some(url) = req.url {
            self.url = url;
        }
        if let Some(status) = req.status {
            self.status = status;
        }
        if let Some(notes) = req.notes {
            self.notes = notes;
        }
    }
}

impl InterviewExperience {
    pub fn apply(&mut self, req: UpdateInterviewRequest) {
        if let Some(date) = req.date {
            self.date = Some(date).filter(|d| !d.is_empty());
        }
        if let Some(round) = req.round {
            self.round = round;
        }
        if let Some(notes) = req.notes {
            self.notes = notes;
        }
        if let Some(outcome) = req.outcome {
            self.outcome = outcome;
        }
    }
}

pub trait HasId {
    fn id_mut(&mut self) -> &mut String;
}

impl HasId for Question {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

impl HasId for InterviewExperience {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

/// Nested records arriving without an id get a fresh one.
pub fn with_ids<T: HasId>(mut items: Vec<T>) -> Vec<T> {
    for item in &mut items {
        let id = item.id_mut();
        if id.trim().is_empty() {
            *id = Uuid::new_v4().to_string();
        }
    }
    items
}
