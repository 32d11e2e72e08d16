use std::collections::BTreeMap;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::product::{Category, CategoryField, Product};
use crate::catalog::repository::{
    CatalogError, CatalogResult, CategoryRepository, ProductRepository,
};
use crate::utilities::database::Database;

const PRODUCT_COLUMNS: &str =
    "id, name, price, url, image, category, category_color, category_emoji, attributes";

/// Catalog persisted in the application's SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn count_products(&self) -> CatalogResult<i64> {
        let conn = self.db.conn.lock().await;
        let count = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Row mapping; attributes are stored as a JSON object in a text column.
fn product_from_row(row: &Row<'_>) -> rusqlite::Result<(Product, String)> {
    let product = Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        url: row.get(3)?,
        image: row.get(4)?,
        category: row.get(5)?,
        category_color: row.get(6)?,
        category_emoji: row.get(7)?,
        attributes: BTreeMap::new(),
    };
    let attributes: String = row.get(8)?;
    Ok((product, attributes))
}

fn with_attributes((mut product, attributes): (Product, String)) -> CatalogResult<Product> {
    product.attributes = serde_json::from_str(&attributes)?;
    Ok(product)
}

#[async_trait]
impl ProductRepository for SqliteStore {
    async fn list(&self) -> CatalogResult<Vec<Product>> {
        let conn = self.db.conn.lock().await;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM products ORDER BY id", PRODUCT_COLUMNS))?;
        let rows = stmt.query_map([], product_from_row)?;

        let mut products = Vec::new();
        for row in rows {
            products.push(with_attributes(row?)?);
        }

        Ok(products)
    }

    async fn get_by_id(&self, id: &str) -> CatalogResult<Option<Product>> {
        let conn = self.db.conn.lock().await;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM products WHERE id = ?1 LIMIT 1", PRODUCT_COLUMNS),
                [id],
                product_from_row,
            )
            .optional()?;

        row.map(with_attributes).transpose()
    }

    async fn save(&self, all: &[Product]) -> CatalogResult<()> {
        let mut conn = self.db.conn.lock().await;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM products", [])?;
        for product in all {
            tx.execute(
                "INSERT INTO products (
                    id, name, price, url, image, category, category_color, category_emoji, attributes
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    product.id,
                    product.name,
                    product.price.as_deref().filter(|p| !p.is_empty()),
                    product.url,
                    product.image.as_deref().filter(|i| !i.is_empty()),
                    product.category,
                    product.category_color,
                    product.category_emoji,
                    serde_json::to_string(&product.attributes)?,
                ],
            )?;
        }

        tx.commit()?;
        debug!(count = all.len(), "Products saved");

        Ok(())
    }

    async fn set_price(&self, id: &str, price: &str) -> CatalogResult<bool> {
        let conn = self.db.conn.lock().await;
        let changed = conn.execute("UPDATE products SET price = ?1 WHERE id = ?2", params![price, id])?;
        Ok(changed > 0)
    }

    async fn set_image(&self, id: &str, image: &str) -> CatalogResult<bool> {
        let conn = self.db.conn.lock().await;
        let changed = conn.execute("UPDATE products SET image = ?1 WHERE id = ?2", params![image, id])?;
        Ok(changed > 0)
    }
}

#[async_trait]
impl CategoryRepository for SqliteStore {
    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let conn = self.db.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT id, name, emoji, color, fields FROM category_definitions ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut categories = Vec::new();
        for row in rows {
            let (id, name, emoji, color, fields) = row?;
            let fields: Vec<CategoryField> = serde_json::from_str(&fields)?;
            categories.push(Category {
                id,
                name,
                emoji,
                color,
                fields,
            });
        }

        Ok(categories)
    }

    async fn save_category(&self, category: &Category) -> CatalogResult<()> {
        if category.name.trim().is_empty() {
            return Err(CatalogError::InvalidCategory {
                reason: "name is required".to_string(),
            });
        }

        let id = if category.id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            category.id.clone()
        };

        let conn = self.db.conn.lock().await;
        conn.execute(
            "INSERT INTO category_definitions (id, name, emoji, color, fields)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(name) DO UPDATE SET
                emoji = excluded.emoji,
                color = excluded.color,
                fields = excluded.fields",
            params![
                id,
                category.name.trim(),
                category.emoji,
                category.color,
                serde_json::to_string(&category.fields)?,
            ],
        )?;

        Ok(())
    }
}
