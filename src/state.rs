use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenKeys;
use crate::services::MirrorService;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub mirror: MirrorService,
    pub tokens: Arc<TokenKeys>,
}
