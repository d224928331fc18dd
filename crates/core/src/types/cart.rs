//! Cart line type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Price, Product, ProductId};

/// One product's entry in the cart.
///
/// Name, price and image are a snapshot taken when the product was added, so
/// the cart stays renderable while the catalog is still loading.
///
/// A line held by the store always has a positive `purchase_quantity`. A line
/// with quantity zero is only ever built as a delete request for the durable
/// cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product this line refers to.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Product name at add time.
    pub name: String,
    /// Unit price at add time.
    pub price: Price,
    /// Product image at add time.
    #[serde(default)]
    pub image: String,
    /// Units the shopper intends to buy.
    pub purchase_quantity: u32,
}

impl CartLine {
    /// Snapshot a product into a new cart line.
    #[must_use]
    pub fn from_product(product: &Product, purchase_quantity: u32) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            purchase_quantity,
        }
    }

    /// Copy of this line with a different purchase quantity.
    #[must_use]
    pub fn with_quantity(&self, purchase_quantity: u32) -> Self {
        Self {
            purchase_quantity,
            ..self.clone()
        }
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.line_total(self.purchase_quantity)
    }
}
