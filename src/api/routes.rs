use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;

use super::analytics::{export_records, get_report, get_sessions};

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analytics", get(get_report))
        .route("/analytics/export", get(export_records))
        .route("/analytics/sessions", get(get_sessions))
}
