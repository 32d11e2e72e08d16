//! Products and categories: the records price updates are merged into.

pub mod import_products;
pub mod product;
pub mod repository;
pub mod sqlite_store;

pub use product::{validate_products, Category, CategoryField, Product, ValidationError};
pub use repository::{CatalogError, CatalogResult, CategoryRepository, ProductRepository};
pub use sqlite_store::SqliteStore;
