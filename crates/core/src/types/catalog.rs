//! Catalog records: products and categories.
//!
//! Both are owned by the remote source of truth. The client only holds
//! cached copies, so neither type exposes mutation helpers.

use serde::{Deserialize, Serialize};

use super::{CategoryId, Price, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    #[serde(rename = "_id")]
    pub id: CategoryId,
    /// Display name.
    pub name: String,
}

/// A product's reference to its category.
///
/// The products query only selects the category ID, so the name is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Referenced category ID.
    #[serde(rename = "_id")]
    pub id: CategoryId,
    /// Category name, when the query selected it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID (unique, stable).
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Image file name, resolved against the image base path by consumers.
    #[serde(default)]
    pub image: String,
    /// Unit price.
    pub price: Price,
    /// Units available in stock.
    #[serde(default)]
    pub quantity: u32,
    /// Owning category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

impl Product {
    /// Whether this product belongs to the given category.
    #[must_use]
    pub fn in_category(&self, category: &CategoryId) -> bool {
        self.category.as_ref().is_some_and(|c| &c.id == category)
    }
}
