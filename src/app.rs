use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::create_api_router;
use crate::config::CorsConfig;
use crate::redirect::create_redirect_router;
use crate::redirect::handlers::route_not_found;
use crate::state::AppState;

/// Assemble the full HTTP surface
pub fn create_app(state: Arc<AppState>, cors: &CorsConfig) -> Router {
    let router = create_redirect_router()
        .merge(create_api_router())
        .fallback(route_not_found);

    let router = if cors.allow_any {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}
