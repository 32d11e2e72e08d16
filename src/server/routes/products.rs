use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::auth::AdminSession;
use crate::catalog::{validate_products, Product};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::routes::NO_STORE;

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub id: Option<String>,
}

/// `GET /api/products[?id=]`
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let products = match query.id {
        Some(id) => state.products.get_by_id(&id).await.map(|found| found.into_iter().collect()),
        None => state.products.list().await,
    };
    let products: Vec<Product> = products.map_err(|e| {
        error!(error = %e, "Failed to read products");
        ApiError::internal("Failed to read products")
    })?;

    Ok((NO_STORE, Json(json!({ "success": true, "products": products }))))
}

/// `POST /api/products`: replace the whole catalog.
///
/// Ids must be unique and every product is checked against its category's
/// declared fields before anything is written.
pub async fn save_products(
    _admin: AdminSession,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let items = body
        .get("products")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::bad_request("Invalid products data"))?;

    let products = items
        .iter()
        .cloned()
        .map(Product::from_json)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::bad_request(format!("Invalid products data: {}", e)))?;

    let categories = state.categories.list_categories().await.map_err(|e| {
        error!(error = %e, "Failed to read categories");
        ApiError::internal("Failed to save products")
    })?;
    validate_products(&products, &categories).map_err(|e| ApiError::bad_request(e.to_string()))?;

    state.products.save(&products).await.map_err(|e| {
        error!(error = %e, "Failed to save products");
        ApiError::internal("Failed to save products")
    })?;

    info!(count = products.len(), "Products saved");

    Ok(Json(json!({
        "success": true,
        "message": "Products saved successfully",
        "count": products.len(),
    })))
}
