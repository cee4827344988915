use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::auth::{ServiceAccountKey, ServiceAccountTokenSource, TokenSource};
use super::cache::{SheetCache, SheetHandle};
use super::dto;
use super::{
    ConnectionReport, HEADER, MirrorRow, SHEET_TITLE, SPREADSHEET_NAME, SheetMirror, SheetsError,
};

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Base URLs of the two Google APIs the mirror talks to, and the limit on
/// any single request to them.
#[derive(Clone, Debug)]
pub struct GoogleApiConfig {
    pub sheets_base_url: String,
    pub drive_base_url: String,
    pub timeout: Duration,
}

impl Default for GoogleApiConfig {
    fn default() -> Self {
        Self {
            sheets_base_url: "https://sheets.googleapis.com/v4".to_string(),
            drive_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct GoogleSheetsClient {
    client: Client,
    config: GoogleApiConfig,
    tokens: Arc<dyn TokenSource>,
    cache: Arc<SheetCache>,
}

impl GoogleSheetsClient {
    pub fn new(
        config: GoogleApiConfig,
        tokens: Arc<dyn TokenSource>,
        cache: Arc<SheetCache>,
    ) -> Result<Self, SheetsError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            tokens,
            cache,
        })
    }

    /// Client authenticated with a service-account key file.
    pub fn from_service_account(path: &Path, cache: Arc<SheetCache>) -> Result<Self, SheetsError> {
        let key = ServiceAccountKey::from_file(path)?;
        info!("loaded Google service account {}", key.client_email);
        let config = GoogleApiConfig::default();
        let http = Client::builder().timeout(config.timeout).build()?;
        let tokens = ServiceAccountTokenSource::new(http, key)?;
        Self::new(config, Arc::new(tokens), cache)
    }

    fn sheets_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.sheets_base_url.trim_end_matches('/'), path)
    }

    fn drive_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.drive_base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, SheetsError> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api { status, body });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SheetsError> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            SheetsError::Unexpected(format!("failed to parse Google response: {}", e))
        })
    }

    async fn list_folder(
        &self,
        folder_id: &str,
        name_filter: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<Vec<dto::DriveFile>, SheetsError> {
        let mut query = format!("'{}' in parents and trashed = false", escape_query(folder_id));
        if let Some(name) = name_filter {
            query = format!(
                "name = '{}' and mimeType = '{}' and {}",
                escape_query(name),
                SPREADSHEET_MIME,
                query
            );
        }

        let mut params = vec![
            ("q", query),
            ("fields", "files(id, name)".to_string()),
            ("spaces", "drive".to_string()),
        ];
        if let Some(size) = page_size {
            params.push(("pageSize", size.to_string()));
        }

        let request = self.client.get(self.drive_url("files")).query(&params);
        let response: dto::FileListResponse = self.send_json(request).await?;
        Ok(response.files)
    }

    async fn find_existing_spreadsheet(&self, folder_id: &str) -> Result<Option<String>, SheetsError> {
        let files = self
            .list_folder(folder_id, Some(SPREADSHEET_NAME), None)
            .await?;
        Ok(files.into_iter().next().map(|f| f.id))
    }

    async fn create_spreadsheet(&self, folder_id: &str) -> Result<SheetHandle, SheetsError> {
        info!("creating mirror spreadsheet in folder {}", folder_id);
        let body = serde_json::json!({
            "properties": { "title": SPREADSHEET_NAME },
            "sheets": [{
                "properties": {
                    "title": SHEET_TITLE,
                    "gridProperties": { "frozenRowCount": 1 }
                }
            }]
        });

        let created: dto::SpreadsheetResponse = self
            .send_json(self.client.post(self.sheets_url("spreadsheets")).json(&body))
            .await?;
        let sheet_id = created
            .sheets
            .first()
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| SheetsError::Unexpected("created spreadsheet has no sheets".to_string()))?;
        let handle = SheetHandle {
            spreadsheet_id: created.spreadsheet_id,
            sheet_id,
        };

        let move_request = self
            .client
            .patch(self.drive_url(&format!("files/{}", handle.spreadsheet_id)))
            .query(&[("addParents", folder_id), ("fields", "id, parents")])
            .json(&serde_json::json!({}));
        self.send(move_request).await?;

        let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
        self.write_row(&handle.spreadsheet_id, 1, header).await?;

        let style = serde_json::json!({
            "repeatCell": {
                "range": {
                    "sheetId": handle.sheet_id,
                    "startRowIndex": 0,
                    "endRowIndex": 1
                },
                "cell": {
                    "userEnteredFormat": {
                        "backgroundColor": { "red": 0.2, "green": 0.2, "blue": 0.2 },
                        "textFormat": {
                            "bold": true,
                            "foregroundColor": { "red": 1, "green": 1, "blue": 1 }
                        }
                    }
                },
                "fields": "userEnteredFormat(backgroundColor,textFormat)"
            }
        });
        self.batch_update(&handle.spreadsheet_id, vec![style]).await?;

        info!("mirror spreadsheet created: {}", handle.spreadsheet_id);
        Ok(handle)
    }

    async fn first_sheet_id(&self, spreadsheet_id: &str) -> Result<i64, SheetsError> {
        let request = self
            .client
            .get(self.sheets_url(&format!("spreadsheets/{}", spreadsheet_id)))
            .query(&[("fields", "sheets.properties")]);
        let spreadsheet: dto::SpreadsheetResponse = self.send_json(request).await?;
        spreadsheet
            .sheets
            .first()
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| SheetsError::Unexpected("spreadsheet has no sheets".to_string()))
    }

    /// Finds or creates the folder's spreadsheet, memoised in the cache.
    async fn spreadsheet_for(&self, folder_id: &str) -> Result<SheetHandle, SheetsError> {
        if folder_id.trim().is_empty() {
            return Err(SheetsError::MissingFolder);
        }
        self.cache
            .resolve(folder_id, || self.locate_spreadsheet(folder_id))
            .await
    }

    async fn locate_spreadsheet(&self, folder_id: &str) -> Result<SheetHandle, SheetsError> {
        match self.find_existing_spreadsheet(folder_id).await? {
            Some(spreadsheet_id) => {
                debug!("found existing spreadsheet {}", spreadsheet_id);
                let sheet_id = self.first_sheet_id(&spreadsheet_id).await?;
                Ok(SheetHandle {
                    spreadsheet_id,
                    sheet_id,
                })
            }
            None => self.create_spreadsheet(folder_id).await,
        }
    }

    async fn write_row(
        &self,
        spreadsheet_id: &str,
        row_index: i64,
        values: Vec<String>,
    ) -> Result<(), SheetsError> {
        let range = format!("{}!A{}:H{}", SHEET_TITLE, row_index, row_index);
        let request = self
            .client
            .put(self.sheets_url(&format!("spreadsheets/{}/values/{}", spreadsheet_id, range)))
            .query(&[("valueInputOption", "RAW")])
            .json(&dto::ValueRange {
                values: vec![values],
            });
        self.send(request).await?;
        Ok(())
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<serde_json::Value>,
    ) -> Result<(), SheetsError> {
        let request = self
            .client
            .post(self.sheets_url(&format!("spreadsheets/{}:batchUpdate", spreadsheet_id)))
            .json(&dto::BatchUpdateRequest { requests });
        self.send(request).await?;
        Ok(())
    }

    async fn next_empty_row(&self, spreadsheet_id: &str) -> Result<i64, SheetsError> {
        let range = format!("{}!A:A", SHEET_TITLE);
        let request = self
            .client
            .get(self.sheets_url(&format!("spreadsheets/{}/values/{}", spreadsheet_id, range)));
        let column: dto::ValueRangeResponse = self.send_json(request).await?;
        Ok(next_row_after(column.values.len()))
    }
}

#[async_trait]
impl SheetMirror for GoogleSheetsClient {
    async fn add_entry(&self, folder_id: &str, row: &MirrorRow) -> Result<i64, SheetsError> {
        let handle = self.spreadsheet_for(folder_id).await?;
        let next_row = self.next_empty_row(&handle.spreadsheet_id).await?;

        debug!("writing entry to {} row {}", handle.spreadsheet_id, next_row);
        self.write_row(
            &handle.spreadsheet_id,
            next_row,
            row.values(&Utc::now().to_rfc3339()),
        )
        .await?;

        let resize = serde_json::json!({
            "autoResizeDimensions": {
                "dimensions": {
                    "sheetId": handle.sheet_id,
                    "dimension": "COLUMNS",
                    "startIndex": 0,
                    "endIndex": HEADER.len()
                }
            }
        });
        if let Err(e) = self.batch_update(&handle.spreadsheet_id, vec![resize]).await {
            warn!("column auto-resize failed: {}", e);
        }

        Ok(next_row)
    }

    async fn update_entry(
        &self,
        folder_id: &str,
        row_index: i64,
        row: &MirrorRow,
    ) -> Result<(), SheetsError> {
        check_data_row(row_index)?;
        let handle = self.spreadsheet_for(folder_id).await?;
        self.write_row(
            &handle.spreadsheet_id,
            row_index,
            row.values(&Utc::now().to_rfc3339()),
        )
        .await
    }

    async fn delete_entry(&self, folder_id: &str, row_index: i64) -> Result<(), SheetsError> {
        check_data_row(row_index)?;
        let handle = self.spreadsheet_for(folder_id).await?;
        let delete = serde_json::json!({
            "deleteDimension": {
                "range": {
                    "sheetId": handle.sheet_id,
                    "dimension": "ROWS",
                    "startIndex": row_index - 1,
                    "endIndex": row_index
                }
            }
        });
        self.batch_update(&handle.spreadsheet_id, vec![delete]).await?;
        debug!("deleted row {} from {}", row_index, handle.spreadsheet_id);
        Ok(())
    }

    async fn test_connection(&self, folder_id: &str) -> Result<ConnectionReport, SheetsError> {
        if folder_id.trim().is_empty() {
            return Err(SheetsError::MissingFolder);
        }
        let drive_files = self.list_folder(folder_id, None, Some(1)).await?;
        let handle = self.spreadsheet_for(folder_id).await?;

        Ok(ConnectionReport {
            drive_api_status: "working".to_string(),
            sheets_api_status: "working".to_string(),
            folder_id: folder_id.to_string(),
            spreadsheet_id: handle.spreadsheet_id,
            drive_files,
        })
    }
}

/// Row 1 is the header; an empty column still writes to row 2.
fn next_row_after(filled_rows: usize) -> i64 {
    if filled_rows == 0 {
        2
    } else {
        filled_rows as i64 + 1
    }
}

fn check_data_row(row_index: i64) -> Result<(), SheetsError> {
    if row_index < 2 {
        return Err(SheetsError::InvalidRow(row_index));
    }
    Ok(())
}

fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_row_never_targets_the_header() {
        assert_eq!(next_row_after(0), 2);
        assert_eq!(next_row_after(1), 2);
        assert_eq!(next_row_after(5), 6);
    }

    #[test]
    fn header_row_cannot_be_updated_or_deleted() {
        assert!(matches!(check_data_row(1), Err(SheetsError::InvalidRow(1))));
        assert!(check_data_row(2).is_ok());
    }

    #[test]
    fn drive_query_quotes_are_escaped() {
        assert_eq!(escape_query("o'brien"), "o\\'brien");
    }
}
