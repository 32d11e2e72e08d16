use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::product::Product;
use crate::catalog::sqlite_store::SqliteStore;
use crate::catalog::repository::ProductRepository;

/// Parse a `products.json` array.
pub fn parse_products(content: &str) -> Result<Vec<Product>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(content).context("Failed to parse products file as a JSON array")?;

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            Product::from_json(value).with_context(|| format!("Invalid product at index {}", index))
        })
        .collect()
}

/// Seed the catalog from a JSON file when it is still empty.
///
/// Returns the number of products inserted; 0 when the catalog already had data.
pub async fn import_products(store: &SqliteStore, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();

    let existing = store.count_products().await?;
    if existing > 0 {
        info!(existing, "Catalog already populated, skipping import");
        return Ok(0);
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let products = parse_products(&content)?;

    store.save(&products).await?;
    info!(count = products.len(), "Products imported");

    Ok(products.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::database::init;

    const PRODUCTS_JSON: &str = r##"[
        {"id": "1", "name": "Dune", "url": "https://www.casadellibro.com/dune", "category": "Libros",
         "categoryColor": "#aa7744", "categoryEmoji": "📚", "author": "Frank Herbert"},
        {"id": "2", "name": "Púa", "price": "1,00€", "url": "https://www.thomann.de/es/pua.htm",
         "category": "Música", "categoryColor": "#000", "categoryEmoji": "🎸"}
    ]"##;

    #[tokio::test]
    async fn imports_only_into_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("products.json");
        tokio::fs::write(&file, PRODUCTS_JSON).await.unwrap();
        let store = SqliteStore::new(init(dir.path().join("db.sqlite")).unwrap());

        assert_eq!(import_products(&store, &file).await.unwrap(), 2);
        assert_eq!(import_products(&store, &file).await.unwrap(), 0);

        let dune = store.get_by_id("1").await.unwrap().unwrap();
        assert_eq!(dune.attributes.get("author").map(String::as_str), Some("Frank Herbert"));
    }

    #[test]
    fn rejects_non_array() {
        assert!(parse_products(r#"{"products": []}"#).is_err());
    }
}
