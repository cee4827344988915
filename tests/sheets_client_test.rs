use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use dsa_tracker::sheets::{
    GoogleApiConfig, GoogleSheetsClient, HEADER, MirrorRow, SheetCache, SheetMirror, SheetsError,
    StaticToken,
};

/// In-memory stand-in for the Drive and Sheets endpoints the client calls.
#[derive(Default)]
struct FakeGoogle {
    existing: Option<String>,
    filled_rows: usize,
    created: usize,
    fail_with: Option<u16>,
    /// Drive lookups for this folder never answer.
    hang_folder: Option<String>,
    log: Vec<Recorded>,
}

#[derive(Clone, Debug)]
struct Recorded {
    method: Method,
    path: String,
    query: String,
    body: Value,
}

type Shared = Arc<Mutex<FakeGoogle>>;

async fn google(
    State(fake): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let query = uri.query().unwrap_or_default().to_string();
    let q: String = url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();

    let hang = {
        let fake = fake.lock().unwrap();
        fake.hang_folder
            .as_ref()
            .is_some_and(|folder| q.contains(&format!("'{}' in parents", folder)))
    };
    if hang {
        std::future::pending::<()>().await;
    }

    let mut fake = fake.lock().unwrap();
    fake.log.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some("Bearer test-token");
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(status) = fake.fail_with {
        return (StatusCode::from_u16(status).unwrap(), "quota exceeded").into_response();
    }

    let reply = if method == Method::GET && path == "/drive/files" {
        if q.contains("name = 'DSA Progress Tracker'") {
            let files: Vec<Value> = fake
                .existing
                .iter()
                .map(|id| json!({ "id": id, "name": "DSA Progress Tracker" }))
                .collect();
            json!({ "files": files })
        } else {
            json!({ "files": [{ "id": "doc-1", "name": "notes" }] })
        }
    } else if method == Method::PATCH && path.starts_with("/drive/files/") {
        json!({})
    } else if method == Method::POST && path == "/sheets/spreadsheets" {
        fake.created += 1;
        fake.existing = Some("sheet-new".to_string());
        json!({
            "spreadsheetId": "sheet-new",
            "sheets": [{ "properties": { "sheetId": 77, "title": "Entries" } }]
        })
    } else if method == Method::POST && path.ends_with(":batchUpdate") {
        json!({})
    } else if method == Method::GET && path.ends_with("/values/Entries!A:A") {
        let values: Vec<Value> = (0..fake.filled_rows).map(|i| json!([i.to_string()])).collect();
        if values.is_empty() {
            json!({ "range": "Entries!A1:A1000" })
        } else {
            json!({ "values": values })
        }
    } else if method == Method::PUT && path.contains("/values/Entries!A") {
        let row: usize = path
            .rsplit("!A")
            .next()
            .and_then(|range| range.split(':').next())
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        fake.filled_rows = fake.filled_rows.max(row);
        json!({})
    } else if method == Method::GET && path.starts_with("/sheets/spreadsheets/") {
        json!({ "sheets": [{ "properties": { "sheetId": 55, "title": "Entries" } }] })
    } else {
        return StatusCode::NOT_FOUND.into_response();
    };

    Json(reply).into_response()
}

async fn start(fake: FakeGoogle) -> (GoogleSheetsClient, Shared) {
    start_with_timeout(fake, Duration::from_secs(10)).await
}

async fn start_with_timeout(fake: FakeGoogle, timeout: Duration) -> (GoogleSheetsClient, Shared) {
    let shared = Arc::new(Mutex::new(fake));
    let app = Router::new().fallback(google).with_state(shared.clone());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake Google API");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = GoogleApiConfig {
        sheets_base_url: format!("http://{}/sheets", addr),
        drive_base_url: format!("http://{}/drive", addr),
        timeout,
    };
    let client = GoogleSheetsClient::new(
        config,
        Arc::new(StaticToken("test-token".to_string())),
        Arc::new(SheetCache::new()),
    )
    .expect("Failed to build client");
    (client, shared)
}

fn calls(shared: &Shared) -> Vec<String> {
    shared
        .lock()
        .unwrap()
        .log
        .iter()
        .map(|r| format!("{} {}", r.method, r.path))
        .collect()
}

fn last_body(shared: &Shared) -> Value {
    shared.lock().unwrap().log.last().unwrap().body.clone()
}

fn sample_row() -> MirrorRow {
    MirrorRow {
        topic: "Arrays".to_string(),
        description: "Find two numbers adding to target.".to_string(),
        problem_link: "https://leetcode.com/problems/two-sum/".to_string(),
        time_complexity: "O(n)".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn first_entry_creates_spreadsheet_with_styled_header() {
    let (client, shared) = start(FakeGoogle::default()).await;

    let row = client.add_entry("folder-1", &sample_row()).await.unwrap();
    assert_eq!(row, 2);

    assert_eq!(
        calls(&shared),
        vec![
            "GET /drive/files",
            "POST /sheets/spreadsheets",
            "PATCH /drive/files/sheet-new",
            "PUT /sheets/spreadsheets/sheet-new/values/Entries!A1:H1",
            "POST /sheets/spreadsheets/sheet-new:batchUpdate",
            "GET /sheets/spreadsheets/sheet-new/values/Entries!A:A",
            "PUT /sheets/spreadsheets/sheet-new/values/Entries!A2:H2",
            "POST /sheets/spreadsheets/sheet-new:batchUpdate",
        ]
    );

    let log = shared.lock().unwrap().log.clone();
    assert_eq!(log[1].body["sheets"][0]["properties"]["title"], "Entries");
    assert!(log[2].query.contains("addParents=folder-1"));
    assert_eq!(log[3].body["values"][0], json!(HEADER));
    assert!(log[3].query.contains("valueInputOption=RAW"));
    let style = &log[4].body["requests"][0]["repeatCell"];
    assert_eq!(style["range"]["sheetId"], 77);
    assert_eq!(style["cell"]["userEnteredFormat"]["textFormat"]["bold"], true);

    let written = &log[6].body["values"][0];
    assert_eq!(written[0], "Arrays");
    assert_eq!(written[2], "https://leetcode.com/problems/two-sum/");
    assert_eq!(written.as_array().unwrap().len(), HEADER.len());
}

#[tokio::test]
async fn cached_spreadsheet_skips_drive_lookup() {
    let (client, shared) = start(FakeGoogle::default()).await;
    client.add_entry("folder-1", &sample_row()).await.unwrap();
    shared.lock().unwrap().log.clear();

    let row = client.add_entry("folder-1", &sample_row()).await.unwrap();
    assert_eq!(row, 3);
    assert_eq!(
        calls(&shared),
        vec![
            "GET /sheets/spreadsheets/sheet-new/values/Entries!A:A",
            "PUT /sheets/spreadsheets/sheet-new/values/Entries!A3:H3",
            "POST /sheets/spreadsheets/sheet-new:batchUpdate",
        ]
    );
    assert_eq!(shared.lock().unwrap().created, 1);
}

#[tokio::test]
async fn existing_spreadsheet_is_reused() {
    let (client, shared) = start(FakeGoogle {
        existing: Some("sheet-old".to_string()),
        filled_rows: 4,
        ..Default::default()
    })
    .await;

    let row = client.add_entry("folder-1", &sample_row()).await.unwrap();
    assert_eq!(row, 5);

    let calls = calls(&shared);
    assert_eq!(calls[0], "GET /drive/files");
    assert_eq!(calls[1], "GET /sheets/spreadsheets/sheet-old");
    assert!(calls.contains(&"PUT /sheets/spreadsheets/sheet-old/values/Entries!A5:H5".to_string()));
    assert_eq!(shared.lock().unwrap().created, 0);
}

#[tokio::test]
async fn concurrent_first_use_creates_one_spreadsheet() {
    let (client, shared) = start(FakeGoogle::default()).await;

    let row_a = sample_row();
    let row_b = sample_row();
    let (a, b) = tokio::join!(
        client.add_entry("folder-1", &row_a),
        client.add_entry("folder-1", &row_b)
    );
    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(shared.lock().unwrap().created, 1);
}

#[tokio::test]
async fn update_rewrites_the_stored_row() {
    let (client, shared) = start(FakeGoogle {
        existing: Some("sheet-old".to_string()),
        filled_rows: 6,
        ..Default::default()
    })
    .await;

    client
        .update_entry("folder-1", 4, &sample_row())
        .await
        .unwrap();
    assert_eq!(
        calls(&shared).last().unwrap(),
        "PUT /sheets/spreadsheets/sheet-old/values/Entries!A4:H4"
    );
    assert_eq!(last_body(&shared)["values"][0][0], "Arrays");
}

#[tokio::test]
async fn delete_removes_one_zero_based_row() {
    let (client, shared) = start(FakeGoogle {
        existing: Some("sheet-old".to_string()),
        filled_rows: 6,
        ..Default::default()
    })
    .await;

    client.delete_entry("folder-1", 3).await.unwrap();

    let range = &last_body(&shared)["requests"][0]["deleteDimension"]["range"];
    assert_eq!(range["sheetId"], 55);
    assert_eq!(range["dimension"], "ROWS");
    assert_eq!(range["startIndex"], 2);
    assert_eq!(range["endIndex"], 3);
}

#[tokio::test]
async fn header_row_and_blank_folder_are_rejected_without_requests() {
    let (client, shared) = start(FakeGoogle::default()).await;

    let err = client.delete_entry("folder-1", 1).await.unwrap_err();
    assert!(matches!(err, SheetsError::InvalidRow(1)));
    let err = client.update_entry("folder-1", 0, &sample_row()).await.unwrap_err();
    assert!(matches!(err, SheetsError::InvalidRow(0)));
    let err = client.add_entry("  ", &sample_row()).await.unwrap_err();
    assert!(matches!(err, SheetsError::MissingFolder));

    assert!(calls(&shared).is_empty());
}

#[tokio::test]
async fn api_errors_carry_status_and_body() {
    let (client, _shared) = start(FakeGoogle {
        fail_with: Some(429),
        ..Default::default()
    })
    .await;

    match client.add_entry("folder-1", &sample_row()).await {
        Err(SheetsError::Api { status, body }) => {
            assert_eq!(status, 429);
            assert_eq!(body, "quota exceeded");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn connection_report_lists_folder_and_spreadsheet() {
    let (client, _shared) = start(FakeGoogle {
        existing: Some("sheet-old".to_string()),
        ..Default::default()
    })
    .await;

    let report = client.test_connection("folder-1").await.unwrap();
    assert_eq!(report.folder_id, "folder-1");
    assert_eq!(report.spreadsheet_id, "sheet-old");
    assert_eq!(report.drive_files.len(), 1);
    assert_eq!(report.drive_files[0].name, "notes");
}

#[tokio::test]
async fn unresponsive_google_times_out() {
    let (client, _shared) = start_with_timeout(
        FakeGoogle {
            hang_folder: Some("folder-stuck".to_string()),
            ..Default::default()
        },
        Duration::from_millis(200),
    )
    .await;

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        client.add_entry("folder-stuck", &sample_row()),
    )
    .await
    .expect("request was not bounded by the client timeout");
    match outcome {
        Err(SheetsError::Http(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn stuck_folder_does_not_block_cached_folder() {
    let (client, _shared) = start(FakeGoogle {
        hang_folder: Some("folder-stuck".to_string()),
        ..Default::default()
    })
    .await;
    let client = Arc::new(client);
    client.add_entry("folder-ok", &sample_row()).await.unwrap();

    let stuck = client.clone();
    let pending = tokio::spawn(async move { stuck.add_entry("folder-stuck", &sample_row()).await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!pending.is_finished());

    let row = tokio::time::timeout(
        Duration::from_secs(2),
        client.add_entry("folder-ok", &sample_row()),
    )
    .await
    .expect("cached folder waited on another folder's lookup")
    .unwrap();
    assert_eq!(row, 3);
    pending.abort();
}
