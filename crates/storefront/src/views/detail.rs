//! Single product page.

use shop_shop_core::{CartLine, Product, ProductId};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::remote::RemoteSource;
use crate::store::Action;
use crate::sync::SyncPolicy;

pub struct DetailView<'a, R> {
    sync: &'a SyncPolicy<R>,
    product: Product,
}

impl<'a, R: RemoteSource> DetailView<'a, R> {
    /// Load the product list if needed and resolve `id` in it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no loaded product has that ID.
    #[instrument(skip(sync))]
    pub async fn activate(sync: &'a SyncPolicy<R>, id: &ProductId) -> Result<Self> {
        sync.sync_products().await;
        let product = sync
            .store()
            .get_state()
            .product(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
        Ok(Self { sync, product })
    }

    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// The product's cart line, if any.
    #[must_use]
    pub fn cart_line(&self) -> Option<CartLine> {
        self.sync
            .store()
            .get_state()
            .cart_line(&self.product.id)
            .cloned()
    }

    #[must_use]
    pub fn in_cart(&self) -> bool {
        self.cart_line().is_some()
    }

    /// Add one unit to the cart.
    pub async fn add_to_cart(&self) -> CartLine {
        super::add_one(self.sync, &self.product).await
    }

    /// Take one unit out of the cart, dropping the line at zero.
    ///
    /// Returns the remaining line, or `None` if the line is gone (or was
    /// never there).
    pub async fn remove_one(&self) -> Option<CartLine> {
        self.sync
            .edit_cart_line(&self.product.id, |line| {
                line.map(|line| Action::RemoveFromCart {
                    id: line.id.clone(),
                    purchase_quantity: i64::from(line.purchase_quantity) - 1,
                })
            })
            .await
    }
}
