use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::scraping::ExtractionFailure;

/// Error body shared by the JSON routes: `{ success: false, error }`.
///
/// The message is user facing; underlying causes are logged where the error
/// is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<ExtractionFailure> for ApiError {
    fn from(failure: ExtractionFailure) -> Self {
        match failure {
            ExtractionFailure::Blocked { .. } => Self::not_found("This link cannot be scraped"),
            ExtractionFailure::NoMatch { .. } => Self::not_found("Price not found"),
            ExtractionFailure::FetchFailed { .. } => Self::internal("Failed to fetch price"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "success": false,
                "error": self.message,
            })),
        )
            .into_response()
    }
}
