//! Consumers of the store: one type per screen of the storefront.
//!
//! # Views
//!
//! - [`CatalogView`] - category menu and product list
//! - [`DetailView`] - a single product
//! - [`CartView`] - the cart drawer and checkout
//! - [`OrderSuccess`] - records the order after payment
//!
//! Every cart change goes through [`SyncPolicy::edit_cart_line`]: the store
//! changes first and the resulting line is then written to the durable
//! cache. A failed cache write is logged and does not undo the change.

mod cart;
mod catalog;
mod detail;
mod order;

pub use cart::{CartItemView, CartSummary, CartView};
pub use catalog::{CatalogLoad, CatalogView};
pub use detail::DetailView;
pub use order::OrderSuccess;

use shop_shop_core::{CartLine, Product};

use crate::remote::RemoteSource;
use crate::store::Action;
use crate::sync::SyncPolicy;

/// Add one unit of `product` to the cart. Returns the line as it now stands.
async fn add_one<R: RemoteSource>(sync: &SyncPolicy<R>, product: &Product) -> CartLine {
    sync.edit_cart_line(&product.id, |line| {
        Some(match line {
            Some(line) => Action::UpdateCartQuantity {
                id: line.id.clone(),
                purchase_quantity: i64::from(line.purchase_quantity.saturating_add(1)),
            },
            None => Action::AddToCart {
                product: product.clone(),
                purchase_quantity: 1,
            },
        })
    })
    .await
    .unwrap_or_else(|| CartLine::from_product(product, 1))
}
