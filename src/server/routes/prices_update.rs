use axum::extract::State;
use axum::Json;
use tracing::error;

use crate::auth::AdminSession;
use crate::batch::{update_prices, BatchReport, Selection};
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// `POST /api/prices/update` with `{ mode: "all" | "no-price" | "select", ids? }`.
///
/// Runs with the configured pacing, so a large selection takes a while to
/// answer.
pub async fn update_prices_handler(
    _admin: AdminSession,
    State(state): State<AppState>,
    Json(selection): Json<Selection>,
) -> Result<Json<BatchReport>, ApiError> {
    let report = update_prices(state.products.clone(), &state.extractor, &selection, &state.batch)
        .await
        .map_err(|e| {
            error!(error = %e, "Price update failed");
            ApiError::internal("Failed to update prices")
        })?;

    Ok(Json(report))
}
