//! Post-payment order recording.

use shop_shop_core::{CartLine, Order, ProductId};
use tracing::{info, instrument};

use crate::error::Result;
use crate::remote::RemoteSource;
use crate::sync::SyncPolicy;

/// Shown when the payment provider sends the shopper back.
pub struct OrderSuccess<'a, R> {
    sync: &'a SyncPolicy<R>,
}

impl<'a, R: RemoteSource> OrderSuccess<'a, R> {
    #[must_use]
    pub const fn new(sync: &'a SyncPolicy<R>) -> Self {
        Self { sync }
    }

    /// Record the cached cart as an order, then empty the cart.
    ///
    /// Returns `None` when there was nothing to order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the cached cart cannot be read, or
    /// `AppError::Remote` if the order is rejected. The cart is left intact in
    /// both cases.
    #[instrument(skip(self))]
    pub async fn complete(&self) -> Result<Option<Order>> {
        let lines: Vec<CartLine> = self.sync.cache().get_all().await?;
        if lines.is_empty() {
            return Ok(None);
        }

        let product_ids: Vec<ProductId> = lines.iter().map(|line| line.id.clone()).collect();
        let order = self
            .sync
            .call_remote(self.sync.remote().submit_order(&product_ids))
            .await?;

        let ordered: Vec<CartLine> = lines
            .into_iter()
            .filter(|line| order.products.iter().any(|item| item.id == line.id))
            .collect();
        self.sync.settle_order(&ordered).await;

        info!(order = %order.id, products = order.products.len(), "Order recorded");
        Ok(Some(order))
    }
}
