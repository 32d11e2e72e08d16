use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub url: Option<String>,
}

/// `GET /api/image-proxy?url=`: relay a remote image with its content type.
pub async fn image_proxy_handler(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::bad_request("URL is required"))?;

    let image = state
        .image_proxy
        .fetch(url)
        .await
        .map_err(|_| ApiError::not_found("Image not found"))?;

    Ok(([(CONTENT_TYPE, image.content_type)], image.bytes))
}
