use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

/// Identifiers of the mirror spreadsheet for one storage folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetHandle {
    pub spreadsheet_id: String,
    pub sheet_id: i64,
}

/// Folder id → spreadsheet handle, with no eviction.
///
/// Each folder owns its own cell. Concurrent first requests for one folder
/// wait on that cell, so only one of them creates a spreadsheet, while other
/// folders are never held up. Separate processes sharing a folder can still
/// race.
#[derive(Debug, Default)]
pub struct SheetCache {
    slots: Mutex<HashMap<String, Arc<OnceCell<SheetHandle>>>>,
}

impl SheetCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, folder_id: &str) -> Arc<OnceCell<SheetHandle>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(folder_id.to_string()).or_default().clone()
    }

    /// Returns the cached handle or runs `resolve` once for the folder. A
    /// failed resolution leaves the cell empty for the next caller.
    pub async fn resolve<F, Fut, E>(&self, folder_id: &str, resolve: F) -> Result<SheetHandle, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SheetHandle, E>>,
    {
        let slot = self.slot(folder_id);
        slot.get_or_try_init(resolve).await.cloned()
    }
}
