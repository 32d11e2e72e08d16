use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attribute keys every category accepts, whether declared or not.
pub const LEGACY_ATTRIBUTES: &[&str] = &["size", "description", "author", "color"];

/// A wish-list item.
///
/// Category specific details (size, author, colour, ...) live in `attributes`
/// and are checked against the owning [`Category`] at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub category: String,
    #[serde(default)]
    pub category_color: String,
    #[serde(default)]
    pub category_emoji: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// Legacy flat layout of `products.json`, where the optional details were
/// top-level fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRecord {
    id: String,
    name: String,
    #[serde(default)]
    price: Option<String>,
    url: String,
    #[serde(default)]
    image: Option<String>,
    category: String,
    #[serde(default)]
    category_color: String,
    #[serde(default)]
    category_emoji: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl Product {
    /// Parse a product from JSON, folding legacy top-level detail fields into
    /// `attributes`.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let record: ProductRecord = serde_json::from_value(value)?;

        let mut attributes = record.attributes;
        for (key, value) in record.extra {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => continue,
                other => other.to_string(),
            };
            if !text.trim().is_empty() {
                attributes.entry(key).or_insert(text);
            }
        }

        Ok(Self {
            id: record.id,
            name: record.name,
            price: record.price.filter(|p| !p.trim().is_empty()),
            url: record.url,
            image: record.image.filter(|i| !i.trim().is_empty()),
            category: record.category,
            category_color: record.category_color,
            category_emoji: record.category_emoji,
            attributes,
        })
    }

    pub fn has_price(&self) -> bool {
        self.price.as_deref().is_some_and(|p| !p.trim().is_empty())
    }

    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|i| !i.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryField {
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub fields: Vec<CategoryField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field `{field}` for category {category}")]
    MissingRequired { category: String, field: String },

    #[error("field `{field}` is not declared by category {category}")]
    Undeclared { category: String, field: String },

    #[error("duplicate product id {id}")]
    DuplicateId { id: String },
}

impl Category {
    /// Check an attribute bag against this category's declared fields.
    ///
    /// Required fields must be present and non-blank. Keys that are neither
    /// declared nor in [`LEGACY_ATTRIBUTES`] are rejected.
    pub fn validate_attributes(&self, attributes: &BTreeMap<String, String>) -> Result<(), ValidationError> {
        for field in self.fields.iter().filter(|f| f.required) {
            let present = attributes
                .get(&field.name)
                .is_some_and(|value| !value.trim().is_empty());
            if !present {
                return Err(ValidationError::MissingRequired {
                    category: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        for key in attributes.keys() {
            let declared = self.fields.iter().any(|f| &f.name == key);
            if !declared && !LEGACY_ATTRIBUTES.contains(&key.as_str()) {
                return Err(ValidationError::Undeclared {
                    category: self.name.clone(),
                    field: key.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Validate a full product list before it replaces the catalog.
///
/// Ids must be unique. Products in unknown categories pass the attribute check;
/// categories without a definition carry no field list.
pub fn validate_products(products: &[Product], categories: &[Category]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(products.len());
    for product in products {
        if !seen.insert(product.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: product.id.clone(),
            });
        }
    }

    for product in products {
        if let Some(category) = categories.iter().find(|c| c.name == product.category) {
            category.validate_attributes(&product.attributes)?;
        }
    }
    Ok(())
}
