//! Storage contracts for the catalog.
//!
//! The price extractor never touches these; callers merge extracted prices into
//! products and persist them through a [`ProductRepository`].

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::product::{Category, Product};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid category: {reason}")]
    InvalidCategory { reason: String },
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products ordered by id.
    async fn list(&self) -> CatalogResult<Vec<Product>>;

    async fn get_by_id(&self, id: &str) -> CatalogResult<Option<Product>>;

    /// Replace the whole collection with `all`.
    async fn save(&self, all: &[Product]) -> CatalogResult<()>;

    /// Set the price of one product, leaving every other record as it is now.
    /// Returns `false` when no product has that id.
    async fn set_price(&self, id: &str, price: &str) -> CatalogResult<bool>;

    /// Same as [`set_price`](Self::set_price) for the image URL.
    async fn set_image(&self, id: &str, image: &str) -> CatalogResult<bool>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All category definitions ordered by name.
    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    /// Insert or update the category with the same name.
    async fn save_category(&self, category: &Category) -> CatalogResult<()>;
}
