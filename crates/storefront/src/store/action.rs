//! Action vocabulary for the store.
//!
//! Actions use the same `type` tags and payload field names as the original
//! browser client, so they can be decoded from JSON (for example when replayed
//! from a log). Unknown tags decode to [`Action::Unrecognized`], which the
//! reducer treats as a no-op.

use serde::{Deserialize, Serialize};
use shop_shop_core::{CartLine, Category, CategoryId, Product, ProductId};

const fn one() -> u32 {
    1
}

/// A request to transition the store state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    /// Replace the product list wholesale.
    #[serde(rename = "UPDATE_PRODUCTS")]
    ReplaceProducts { products: Vec<Product> },

    /// Replace the category list wholesale.
    #[serde(rename = "UPDATE_CATEGORIES")]
    ReplaceCategories { categories: Vec<Category> },

    /// Set (or clear) the category filter.
    #[serde(rename = "UPDATE_CURRENT_CATEGORY")]
    SetCurrentCategory { current_category: Option<CategoryId> },

    /// Add a product that is not yet in the cart.
    AddToCart {
        product: Product,
        #[serde(default = "one")]
        purchase_quantity: u32,
    },

    /// Append a batch of cart lines (cache restore). Does not open the cart.
    AddMultipleToCart { products: Vec<CartLine> },

    /// Set the quantity of an existing line.
    UpdateCartQuantity {
        #[serde(rename = "_id")]
        id: ProductId,
        purchase_quantity: i64,
    },

    /// Set the resulting quantity of a line, removing it when not positive.
    RemoveFromCart {
        #[serde(rename = "_id")]
        id: ProductId,
        purchase_quantity: i64,
    },

    /// Empty the cart and close it.
    ClearCart,

    /// Flip the cart-open flag.
    #[serde(rename = "TOGGLE_CART")]
    ToggleCartOpen,

    /// Any tag outside the vocabulary.
    #[serde(other)]
    Unrecognized,
}

impl Action {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ReplaceProducts { .. } => "replace_products",
            Self::ReplaceCategories { .. } => "replace_categories",
            Self::SetCurrentCategory { .. } => "set_current_category",
            Self::AddToCart { .. } => "add_to_cart",
            Self::AddMultipleToCart { .. } => "add_multiple_to_cart",
            Self::UpdateCartQuantity { .. } => "update_cart_quantity",
            Self::RemoveFromCart { .. } => "remove_from_cart",
            Self::ClearCart => "clear_cart",
            Self::ToggleCartOpen => "toggle_cart_open",
            Self::Unrecognized => "unrecognized",
        }
    }
}
