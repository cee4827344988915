use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::models::Entry;
use crate::sheets::{ConnectionReport, MirrorRow, SheetMirror, SheetsError};

/// Wraps a [`SheetMirror`] so that mirror failures never fail a request.
///
/// Every failure is logged and dropped; the document store stays authoritative.
/// A mirror call that outlives the timeout counts as a failure.
#[derive(Clone)]
pub struct MirrorService {
    mirror: Arc<dyn SheetMirror>,
    timeout: Duration,
}

pub const DEFAULT_MIRROR_TIMEOUT: Duration = Duration::from_secs(15);

impl MirrorService {
    pub fn new(mirror: Arc<dyn SheetMirror>) -> Self {
        Self {
            mirror,
            timeout: DEFAULT_MIRROR_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T, SheetsError>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                log_failure(operation, &e);
                None
            }
            Err(_) => {
                warn!(
                    "sheet mirror {} timed out after {:?}",
                    operation, self.timeout
                );
                None
            }
        }
    }

    /// Returns the row the entry landed on, or `None` if mirroring failed.
    pub async fn record_created(&self, folder_id: &str, row: &MirrorRow) -> Option<i64> {
        let row_index = self
            .bounded("add", self.mirror.add_entry(folder_id, row))
            .await?;
        info!("mirrored entry to sheet row {}", row_index);
        Some(row_index)
    }

    pub async fn record_updated(&self, folder_id: &str, entry: &Entry) {
        let Some(row_index) = entry.sheet_row_index else {
            debug!("entry {} has no sheet row, skipping mirror update", entry.id);
            return;
        };
        let row = MirrorRow::from(entry);
        self.bounded("update", self.mirror.update_entry(folder_id, row_index, &row))
            .await;
    }

    /// Rows below the deleted one shift up; their stored indices are left as-is.
    pub async fn record_deleted(&self, folder_id: &str, entry: &Entry) {
        let Some(row_index) = entry.sheet_row_index else {
            return;
        };
        self.bounded("delete", self.mirror.delete_entry(folder_id, row_index))
            .await;
    }

    pub async fn status(&self, folder_id: &str) -> Result<ConnectionReport, SheetsError> {
        self.mirror.test_connection(folder_id).await
    }
}

fn log_failure(operation: &str, error: &SheetsError) {
    match error {
        SheetsError::Disabled => debug!("sheet mirror disabled, skipped {}", operation),
        other => warn!("sheet mirror {} failed: {}", operation, other),
    }
}
