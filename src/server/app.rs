//! Application state and router.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::{SessionStore, StaticCredentials};
use crate::batch::BatchOptions;
use crate::catalog::{CategoryRepository, ProductRepository, SqliteStore};
use crate::config::AppConfig;
use crate::image_proxy::{HttpImageProxy, ImageProxy};
use crate::scraping::PriceExtractor;
use crate::server::routes::{
    health_handler, image_proxy_handler, list_categories, list_products, login, logout,
    price_handler, save_category, save_products, update_prices_handler,
};
use crate::utilities::database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub extractor: PriceExtractor,
    pub products: Arc<dyn ProductRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub sessions: SessionStore,
    pub image_proxy: Arc<dyn ImageProxy>,
    pub batch: BatchOptions,
}

impl AppState {
    /// Wire the production collaborators: SQLite catalog, HTTP fetchers and
    /// the configured admin account.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let db = database::init(&config.database.path)?;
        let store = Arc::new(SqliteStore::new(db));

        Ok(Self {
            extractor: PriceExtractor::from_config(&config.scraper)?,
            products: store.clone(),
            categories: store,
            sessions: SessionStore::new(Arc::new(StaticCredentials::from(&config.admin))),
            image_proxy: Arc::new(HttpImageProxy::new(&config.scraper)?),
            batch: BatchOptions::from(&config.batch),
        })
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/price", get(price_handler))
        .route("/api/products", get(list_products).post(save_products))
        .route("/api/categories", get(list_categories).post(save_category))
        .route("/api/auth", post(login).delete(logout))
        .route("/api/prices/update", post(update_prices_handler))
        .route("/api/image-proxy", get(image_proxy_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
