use axum::{
    extract::{ConnectInfo, Path, State},
    http::{
        header::{self, HeaderMap, HeaderName, HeaderValue},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Local;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::middleware::RequestStart;
use crate::analytics::scan_log::log_scan;
use crate::analytics::{extract_client_ip, sanitize_for_storage, AnalyticsEvent, ScanRequest};
use crate::error::GatewayError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub routes: Vec<String>,
    pub documentation: &'static str,
}

/// Service metadata and the list of redirect routes
pub async fn service_info(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "QR Redirect Microservice",
        status: "operational",
        version: env!("CARGO_PKG_VERSION"),
        routes: state.routes.paths(),
        documentation: "GET /r/{slug} redirects; GET /analytics reports scan metrics",
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Record the scan and redirect to the slug's target URL
pub async fn redirect_scan(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Extension(RequestStart(request_start)): Extension<RequestStart>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let Some(target_url) = state.routes.get(&slug) else {
        warn!(slug = %slug, "404: slug not found in route table");
        return Err(GatewayError::RedirectNotFound {
            slug,
            available_routes: state.routes.slugs(),
        });
    };

    let Ok(location) = HeaderValue::from_str(target_url) else {
        error!(slug = %slug, "target URL is not a valid Location header");
        return Err(GatewayError::InvalidTarget { slug });
    };

    let client_ip = extract_client_ip(&headers, addr.ip(), &state.analytics).to_string();
    let now = Local::now().fixed_offset();
    let latency_ms = request_start.elapsed().as_millis() as u64;

    let metrics = state.scanner.analyze(&ScanRequest {
        user_agent: header_str(&headers, header::USER_AGENT),
        referrer: header_str(&headers, header::REFERER),
        client_ip: &client_ip,
        now,
        latency_ms: Some(latency_ms),
    });
    let scan_ip = metrics.ip.clone();

    let event = AnalyticsEvent {
        metrics,
        timestamp: now,
        slug,
        target_url: target_url.to_string(),
        latency: Some(latency_ms),
    };
    let record = sanitize_for_storage(event);

    log_scan(&record, target_url);
    info!(
        slug = %record.slug,
        score = record.quality_score,
        device = %record.device.device_type,
        "redirecting scan to {}",
        target_url
    );
    state.store.append(record).await;

    // Geo inference runs off the redirect path and may only log
    let geo = Arc::clone(&state.geo);
    tokio::spawn(async move {
        let place = geo.infer(&scan_ip).await;
        debug!(country = %place.country, city = %place.city, "geo inference complete");
    });

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::LOCATION, location);
    response_headers.insert(
        "x-qr-timing-handler-ms",
        HeaderValue::from(request_start.elapsed().as_millis() as u64),
    );

    Ok((StatusCode::FOUND, response_headers).into_response())
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}

/// Fallback for any path without a handler
pub async fn route_not_found(State(state): State<Arc<AppState>>) -> GatewayError {
    let mut available_routes = vec!["/".to_string()];
    available_routes.extend(state.routes.paths());
    GatewayError::RouteNotFound { available_routes }
}
