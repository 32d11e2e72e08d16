use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::scraping::fetch_price::parse_target_url;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub success: bool,
    pub price: String,
    pub url: String,
}

/// `GET /api/price?url=`: fetch a product page and return its price.
///
/// 400 for a missing or non-http(s) URL, 404 when no price is found or the
/// host is blocked, 500 when the page could not be fetched.
pub async fn price_handler(
    State(state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<PriceResponse>, ApiError> {
    let url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::bad_request("URL is required"))?;

    parse_target_url(url).map_err(|_| ApiError::bad_request("Invalid URL"))?;

    let found = state.extractor.fetch_price(url).await?;

    Ok(Json(PriceResponse {
        success: true,
        price: found.normalized_price,
        url: url.to_string(),
    }))
}
