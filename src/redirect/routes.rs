use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;

use super::handlers::{health_check, redirect_scan, service_info};
use super::middleware::record_request_start;

pub fn create_redirect_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/r/{slug}", get(redirect_scan))
        .layer(middleware::from_fn(record_request_start))
}
