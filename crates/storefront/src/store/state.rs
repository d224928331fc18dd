//! The store's state value.

use std::sync::Arc;

use rust_decimal::Decimal;
use shop_shop_core::{CartLine, Category, CategoryId, Product, ProductId};

/// Snapshot of the storefront state.
///
/// Collections sit behind `Arc` so untouched fields are shared between
/// successive states. A transition that changes a collection always installs
/// a fresh `Arc`, which lets consumers detect real changes with
/// [`StoreState::same_as`] instead of comparing contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    /// Catalog products, replaced wholesale on sync.
    pub products: Arc<Vec<Product>>,
    /// Catalog categories, replaced wholesale on sync.
    pub categories: Arc<Vec<Category>>,
    /// Category filter; `None` shows every product.
    pub current_category: Option<CategoryId>,
    /// Cart lines, unique by product ID.
    pub cart: Arc<Vec<CartLine>>,
    /// Whether the cart panel is open.
    pub cart_open: bool,
}

impl StoreState {
    /// True when `other` is the very same state: every collection is the
    /// same allocation and the scalar fields are equal.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.products, &other.products)
            && Arc::ptr_eq(&self.categories, &other.categories)
            && Arc::ptr_eq(&self.cart, &other.cart)
            && self.current_category == other.current_category
            && self.cart_open == other.cart_open
    }

    /// Look up a catalog product.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Look up the cart line for a product.
    #[must_use]
    pub fn cart_line(&self, id: &ProductId) -> Option<&CartLine> {
        self.cart.iter().find(|line| &line.id == id)
    }

    /// Products matching the current category filter.
    pub fn visible_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| {
            self.current_category
                .as_ref()
                .is_none_or(|category| p.in_category(category))
        })
    }

    /// Sum of price × quantity over the cart, rounded to cents.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.cart
            .iter()
            .map(CartLine::line_total)
            .sum::<Decimal>()
            .round_dp(2)
    }

    /// Total units across all cart lines.
    #[must_use]
    pub fn cart_item_count(&self) -> u32 {
        self.cart
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.purchase_quantity))
    }
}
