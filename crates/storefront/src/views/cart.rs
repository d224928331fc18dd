//! Cart drawer and checkout.

use shop_shop_core::{CartLine, ProductId};
use tracing::{info, instrument};
use url::Url;

use crate::error::{AppError, Result};
use crate::format::{format_amount, format_price, pluralize};
use crate::remote::RemoteSource;
use crate::services::{AuthGate, PaymentRedirect};
use crate::store::{Action, StoreState};
use crate::sync::SyncPolicy;

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
    pub item_label: String,
    pub open: bool,
}

impl CartSummary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&StoreState> for CartSummary {
    fn from(state: &StoreState) -> Self {
        let item_count = state.cart_item_count();
        Self {
            items: state.cart.iter().map(CartItemView::from).collect(),
            subtotal: format_amount(state.cart_total()),
            item_count,
            item_label: pluralize("item", u64::from(item_count)),
            open: state.cart_open,
        }
    }
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.clone(),
            name: line.name.clone(),
            image: line.image.clone(),
            quantity: line.purchase_quantity,
            price: format_price(line.price),
            line_price: format_amount(line.line_total()),
        }
    }
}

/// The cart drawer.
pub struct CartView<'a, R> {
    sync: &'a SyncPolicy<R>,
}

impl<'a, R: RemoteSource> CartView<'a, R> {
    #[must_use]
    pub const fn new(sync: &'a SyncPolicy<R>) -> Self {
        Self { sync }
    }

    /// Restore a cart saved by an earlier session. Returns the lines restored.
    pub async fn activate(&self) -> usize {
        self.sync.restore_cart().await
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::from(self.sync.store().get_state().as_ref())
    }

    /// Open or close the drawer. Returns whether it is now open.
    pub fn toggle(&self) -> bool {
        self.sync.store().dispatch(Action::ToggleCartOpen);
        self.sync.store().get_state().cart_open
    }

    /// Set a line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product has no cart line.
    #[instrument(skip(self))]
    pub async fn set_quantity(&self, id: &ProductId, quantity: i64) -> Result<()> {
        self.line(id)?;
        let quantity = quantity.min(i64::from(u32::MAX));
        self.sync
            .edit_cart_line(id, |line| {
                line.map(|line| {
                    if quantity <= 0 {
                        Action::RemoveFromCart {
                            id: line.id.clone(),
                            purchase_quantity: 0,
                        }
                    } else {
                        Action::UpdateCartQuantity {
                            id: line.id.clone(),
                            purchase_quantity: quantity,
                        }
                    }
                })
            })
            .await;
        Ok(())
    }

    /// Remove a product's line entirely.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product has no cart line.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &ProductId) -> Result<()> {
        self.line(id)?;
        self.sync
            .edit_cart_line(id, |line| {
                line.map(|line| Action::RemoveFromCart {
                    id: line.id.clone(),
                    purchase_quantity: 0,
                })
            })
            .await;
        Ok(())
    }

    /// Empty the cart and close the drawer.
    pub async fn clear(&self) {
        self.sync.clear_cart().await;
    }

    /// Start payment for everything in the cart.
    ///
    /// Each product ID is sent once per unit. Returns the payment page the
    /// shopper was sent to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` or `AppError::EmptyCart` before any
    /// remote call, or the remote/redirect failure.
    #[instrument(skip_all)]
    pub async fn checkout(
        &self,
        auth: &impl AuthGate,
        redirect: &impl PaymentRedirect,
    ) -> Result<Url> {
        if !auth.is_logged_in() {
            return Err(AppError::NotLoggedIn);
        }

        let state = self.sync.store().get_state();
        if state.cart.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let product_ids: Vec<ProductId> = state
            .cart
            .iter()
            .flat_map(|line| {
                std::iter::repeat_n(
                    line.id.clone(),
                    usize::try_from(line.purchase_quantity).unwrap_or_default(),
                )
            })
            .collect();

        let session = self
            .sync
            .call_remote(self.sync.remote().create_checkout_session(&product_ids))
            .await?;
        info!(units = product_ids.len(), session = %session, "Checkout session created");

        Ok(redirect.redirect(&session)?)
    }

    fn line(&self, id: &ProductId) -> Result<CartLine> {
        self.sync
            .store()
            .get_state()
            .cart_line(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("cart line {id}")))
    }

}
