pub mod auth;
pub mod categories;
pub mod health;
pub mod image_proxy;
pub mod price;
pub mod prices_update;
pub mod products;

pub use auth::{login, logout};
pub use categories::{list_categories, save_category};
pub use health::health_handler;
pub use image_proxy::image_proxy_handler;
pub use price::price_handler;
pub use prices_update::update_prices_handler;
pub use products::{list_products, save_products};

use axum::http::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use axum::http::HeaderName;

/// Headers keeping browsers and proxies from caching catalog reads.
pub const NO_STORE: [(HeaderName, &str); 3] = [
    (CACHE_CONTROL, "no-store, no-cache, must-revalidate, proxy-revalidate"),
    (PRAGMA, "no-cache"),
    (EXPIRES, "0"),
];
