//! Best-effort mirror of entries into a per-folder Google spreadsheet.
//!
//! The spreadsheet is a convenience export, never a source of truth. Each
//! entry remembers the 1-based row it was written to (`sheet_row_index`).
//! Deleting a row shifts every later row up by one and nothing rewrites the
//! stored indices of the entries below it, so they drift out of step.

pub mod auth;
pub mod cache;
pub mod client;
pub mod dto;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Entry, NewEntryRequest};

pub use auth::{ServiceAccountKey, ServiceAccountTokenSource, StaticToken, TokenSource};
pub use cache::{SheetCache, SheetHandle};
pub use client::{GoogleApiConfig, GoogleSheetsClient};
pub use dto::DriveFile;

pub const SPREADSHEET_NAME: &str = "DSA Progress Tracker";
pub const SHEET_TITLE: &str = "Entries";
pub const HEADER: [&str; 8] = [
    "Topic",
    "Description",
    "Problem Link",
    "Approach",
    "Code",
    "Time Complexity",
    "Space Complexity",
    "Created At",
];

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Google Sheets service is not initialized")]
    Disabled,

    #[error("Folder ID is required")]
    MissingFolder,

    #[error("row {0} is not a data row")]
    InvalidRow(i64),

    #[error("credentials error: {0}")]
    Credentials(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// The mirrored columns of an entry, in sheet order minus the timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MirrorRow {
    pub topic: String,
    pub description: String,
    pub problem_link: String,
    pub approach: String,
    pub code: String,
    pub time_complexity: String,
    pub space_complexity: String,
}

impl MirrorRow {
    pub fn values(&self, timestamp: &str) -> Vec<String> {
        vec![
            self.topic.clone(),
            self.description.clone(),
            self.problem_link.clone(),
            self.approach.clone(),
            self.code.clone(),
            self.time_complexity.clone(),
            self.space_complexity.clone(),
            timestamp.to_string(),
        ]
    }
}

impl From<&NewEntryRequest> for MirrorRow {
    fn from(req: &NewEntryRequest) -> Self {
        Self {
            topic: req.topic.clone(),
            description: req.description.clone(),
            problem_link: req.problem_link.clone(),
            approach: req.approach.clone(),
            code: req.code.clone(),
            time_complexity: req.time_complexity.clone(),
            space_complexity: req.space_complexity.clone(),
        }
    }
}

impl From<&Entry> for MirrorRow {
    fn from(entry: &Entry) -> Self {
        Self {
            topic: entry.topic.clone(),
            description: entry.description.clone(),
            problem_link: entry.problem_link.clone(),
            approach: entry.approach.clone(),
            code: entry.code.clone(),
            time_complexity: entry.time_complexity.clone(),
            space_complexity: entry.space_complexity.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
    pub drive_api_status: String,
    pub sheets_api_status: String,
    pub folder_id: String,
    pub spreadsheet_id: String,
    pub drive_files: Vec<DriveFile>,
}

#[async_trait]
pub trait SheetMirror: Send + Sync {
    /// Appends a row and returns its 1-based index.
    async fn add_entry(&self, folder_id: &str, row: &MirrorRow) -> Result<i64, SheetsError>;
    async fn update_entry(
        &self,
        folder_id: &str,
        row_index: i64,
        row: &MirrorRow,
    ) -> Result<(), SheetsError>;
    async fn delete_entry(&self, folder_id: &str, row_index: i64) -> Result<(), SheetsError>;
    async fn test_connection(&self, folder_id: &str) -> Result<ConnectionReport, SheetsError>;
}

/// Stand-in when no service-account credentials are configured.
pub struct NoopSheetMirror;

#[async_trait]
impl SheetMirror for NoopSheetMirror {
    async fn add_entry(&self, _folder_id: &str, _row: &MirrorRow) -> Result<i64, SheetsError> {
        Err(SheetsError::Disabled)
    }

    async fn update_entry(
        &self,
        _folder_id: &str,
        _row_index: i64,
        _row: &MirrorRow,
    ) -> Result<(), SheetsError> {
        Err(SheetsError::Disabled)
    }

    async fn delete_entry(&self, _folder_id: &str, _row_index: i64) -> Result<(), SheetsError> {
        Err(SheetsError::Disabled)
    }

    async fn test_connection(&self, _folder_id: &str) -> Result<ConnectionReport, SheetsError> {
        Err(SheetsError::Disabled)
    }
}
