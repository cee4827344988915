use std::path::PathBuf;
use std::sync::Arc;

use dsa_tracker::sheets::{GoogleSheetsClient, MirrorRow, SheetCache, SheetMirror};

fn live_client() -> (GoogleSheetsClient, String) {
    dotenvy::dotenv().ok();

    let path = std::env::var("GOOGLE_CREDENTIALS_PATH").expect("GOOGLE_CREDENTIALS_PATH not set");
    let folder_id = std::env::var("TEST_FOLDER_ID").expect("TEST_FOLDER_ID not set");
    let client = GoogleSheetsClient::from_service_account(
        &PathBuf::from(path),
        Arc::new(SheetCache::new()),
    )
    .expect("Failed to create Google Sheets client");
    (client, folder_id)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
async fn test_connection_against_real_folder() {
    let (client, folder_id) = live_client();

    let report = client
        .test_connection(&folder_id)
        .await
        .expect("Connection test failed");
    println!("Connection report: {:?}", report);

    assert_eq!(report.folder_id, folder_id);
    assert!(!report.spreadsheet_id.is_empty(), "No spreadsheet resolved");
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
async fn test_add_update_delete_row() {
    let (client, folder_id) = live_client();

    let row = MirrorRow {
        topic: "Integration".to_string(),
        description: format!("Live test - {}", chrono::Utc::now().timestamp()),
        problem_link: "https://leetcode.com/problems/two-sum/".to_string(),
        ..Default::default()
    };

    let row_index = client
        .add_entry(&folder_id, &row)
        .await
        .expect("Failed to add row");
    println!("Row written at {}", row_index);
    assert!(row_index >= 2, "Row landed on the header");

    let updated = MirrorRow {
        approach: "Updated approach".to_string(),
        ..row
    };
    client
        .update_entry(&folder_id, row_index, &updated)
        .await
        .expect("Failed to update row");

    client
        .delete_entry(&folder_id, row_index)
        .await
        .expect("Failed to delete row");
}
