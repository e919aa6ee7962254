use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Client-correctable errors surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("redirect not found for slug '{slug}'")]
    RedirectNotFound {
        slug: String,
        available_routes: Vec<String>,
    },
    #[error("route not found")]
    RouteNotFound { available_routes: Vec<String> },
    #[error("{0}")]
    InvalidQuery(String),
    #[error("target URL for slug '{slug}' is not a valid Location header")]
    InvalidTarget { slug: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_routes: Option<Vec<String>>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            GatewayError::RedirectNotFound {
                slug,
                available_routes,
            } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "Redirect not found".to_string(),
                    slug: Some(slug),
                    available_routes: Some(available_routes),
                },
            ),
            GatewayError::RouteNotFound { available_routes } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "Route not found".to_string(),
                    slug: None,
                    available_routes: Some(available_routes),
                },
            ),
            GatewayError::InvalidQuery(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    slug: None,
                    available_routes: None,
                },
            ),
            GatewayError::InvalidTarget { slug } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Invalid redirect target".to_string(),
                    slug: Some(slug),
                    available_routes: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
