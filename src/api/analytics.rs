//! Analytics API handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analytics::{
    build_report, calculate_velocity, detect_session_windows, to_csv, ExportFormat, ReportView,
    SessionWindow,
};
use crate::error::GatewayError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    /// Restrict the report to one slug
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub slug: Option<String>,

    /// `json` (default) or `csv`
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionParams {
    pub slug: Option<String>,

    /// Maximum gap in minutes between scans of one window
    pub window: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsResponse {
    pub slug: String,
    pub window_minutes: u32,
    pub windows: Vec<SessionWindow>,

    /// Scans per minute over the most recent scans
    pub velocity: f64,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Aggregate report, optionally filtered by slug
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
) -> Json<ReportView> {
    let slug = non_empty(&params.slug);
    let (records, summary) = state.store.snapshot(slug).await;

    Json(build_report(&records, slug, &state.routes, summary))
}

/// Dump sanitized records as JSON or CSV
pub async fn export_records(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> Result<Response, GatewayError> {
    let format = match non_empty(&params.format) {
        Some(f) => f.parse::<ExportFormat>().map_err(GatewayError::InvalidQuery)?,
        None => ExportFormat::default(),
    };

    let records = state.store.records(non_empty(&params.slug)).await;

    let response = match format {
        ExportFormat::Json => Json(records).into_response(),
        ExportFormat::Csv => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"qr-analytics.csv\"",
                ),
            ],
            to_csv(&records),
        )
            .into_response(),
    };

    Ok(response)
}

/// Session windows and velocity for one slug
pub async fn get_sessions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionParams>,
) -> Result<Json<SessionsResponse>, GatewayError> {
    let slug = non_empty(&params.slug)
        .ok_or_else(|| GatewayError::InvalidQuery("slug query parameter is required".to_string()))?
        .to_string();

    let window_minutes = match non_empty(&params.window) {
        Some(raw) => raw.parse::<u32>().ok().filter(|&m| m > 0).ok_or_else(|| {
            GatewayError::InvalidQuery(format!(
                "window must be a whole number of minutes, at least 1 (got '{raw}')"
            ))
        })?,
        None => state.analytics.session_window_minutes,
    };

    let timestamps = state.store.timestamps(&slug).await;

    Ok(Json(SessionsResponse {
        windows: detect_session_windows(&timestamps, window_minutes),
        velocity: calculate_velocity(&timestamps),
        slug,
        window_minutes,
    }))
}
