//! Price extraction engine for a gift wish-list, with the catalog, admin
//! session and HTTP surface around it.

pub mod auth;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod image_proxy;
pub mod scraping;
pub mod server;
pub mod utilities;
