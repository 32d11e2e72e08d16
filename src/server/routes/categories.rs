use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use tracing::error;

use crate::auth::AdminSession;
use crate::catalog::{CatalogError, Category};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::routes::NO_STORE;

pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state.categories.list_categories().await.map_err(|e| {
        error!(error = %e, "Failed to read categories");
        ApiError::internal("Failed to read categories")
    })?;

    Ok((NO_STORE, Json(json!({ "success": true, "categories": categories }))))
}

/// `POST /api/categories` with body `{ category }`; upserts by name.
pub async fn save_category(
    _admin: AdminSession,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let category = body
        .get("category")
        .cloned()
        .and_then(|value| serde_json::from_value::<Category>(value).ok())
        .filter(|category| !category.name.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Invalid category data"))?;

    match state.categories.save_category(&category).await {
        Ok(()) => Ok(Json(json!({
            "success": true,
            "message": "Category saved successfully",
        }))),
        Err(CatalogError::InvalidCategory { reason }) => Err(ApiError::bad_request(reason)),
        Err(e) => {
            error!(error = %e, category = %category.name, "Failed to save category");
            Err(ApiError::internal("Failed to save category"))
        }
    }
}
