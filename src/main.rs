use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dsa_tracker::api::router;
use dsa_tracker::auth::TokenKeys;
use dsa_tracker::config::AppConfig;
use dsa_tracker::db;
use dsa_tracker::services::MirrorService;
use dsa_tracker::sheets::{GoogleSheetsClient, NoopSheetMirror, SheetCache, SheetMirror};
use dsa_tracker::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "dsa_tracker=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::connect(&config.database_url, 5).await?;
    info!("database ready at {}", config.database_url);

    let mirror: Arc<dyn SheetMirror> = match &config.google_credentials_path {
        Some(path) => match GoogleSheetsClient::from_service_account(path, Arc::new(SheetCache::new())) {
            Ok(client) => {
                info!("mirroring entries to Google Sheets");
                Arc::new(client)
            }
            Err(e) => {
                warn!("Google Sheets disabled, could not load {}: {}", path.display(), e);
                Arc::new(NoopSheetMirror)
            }
        },
        None => {
            info!("GOOGLE_CREDENTIALS_PATH not set, spreadsheet mirroring disabled");
            Arc::new(NoopSheetMirror)
        }
    };

    let state = AppState {
        db: pool,
        mirror: MirrorService::new(mirror)
            .with_timeout(Duration::from_secs(config.mirror_timeout_secs)),
        tokens: Arc::new(TokenKeys::new(&config.jwt_secret, config.token_ttl_hours)),
    };

    let app = router(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
