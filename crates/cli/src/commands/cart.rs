//! Cart commands.
//!
//! Each command restores the saved cart first, since every invocation starts
//! with an empty store.

use std::io::Write;

use shop_shop_core::ProductId;
use shop_shop_storefront::remote::RemoteSource;
use shop_shop_storefront::services::{CheckoutLinkRedirect, TokenAuth};
use shop_shop_storefront::state::AppState;
use shop_shop_storefront::views::{CartSummary, CartView, CatalogView};

use super::CommandError;

fn write_summary(summary: &CartSummary, out: &mut impl Write) -> std::io::Result<()> {
    if summary.is_empty() {
        return writeln!(out, "You haven't added anything to your cart yet!");
    }
    writeln!(out, "Shopping Cart")?;
    for item in &summary.items {
        writeln!(
            out,
            "  {:<24} {:>3} x {:>10} = {:>10}  [{}]",
            item.name, item.quantity, item.price, item.line_price, item.id
        )?;
    }
    writeln!(
        out,
        "Total: {} ({} {})",
        summary.subtotal, summary.item_count, summary.item_label
    )
}

async fn restored<R: RemoteSource>(state: &AppState<R>) -> CartView<'_, R> {
    let view = CartView::new(state.sync());
    view.activate().await;
    view
}

/// Print the cart.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub async fn show<R: RemoteSource>(
    state: &AppState<R>,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let view = restored(state).await;
    write_summary(&view.summary(), out)?;
    Ok(())
}

/// Add one unit of a catalog product.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product is not in the catalog.
pub async fn add<R: RemoteSource>(
    state: &AppState<R>,
    id: &ProductId,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let cart = restored(state).await;
    let catalog = CatalogView::new(state.sync());
    state.sync().sync_products().await;
    let line = catalog.add_to_cart(id).await?;
    writeln!(out, "Added {} (now {})", line.name, line.purchase_quantity)?;
    write_summary(&cart.summary(), out)?;
    Ok(())
}

/// Remove a product's line.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product is not in the cart.
pub async fn remove<R: RemoteSource>(
    state: &AppState<R>,
    id: &ProductId,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let view = restored(state).await;
    view.remove(id).await?;
    write_summary(&view.summary(), out)?;
    Ok(())
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product is not in the cart.
pub async fn set<R: RemoteSource>(
    state: &AppState<R>,
    id: &ProductId,
    quantity: i64,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let view = restored(state).await;
    view.set_quantity(id, quantity).await?;
    write_summary(&view.summary(), out)?;
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub async fn clear<R: RemoteSource>(
    state: &AppState<R>,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let view = restored(state).await;
    view.clear().await;
    write_summary(&view.summary(), out)?;
    Ok(())
}

/// Flip the drawer state and show the cart when it opens.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub async fn toggle<R: RemoteSource>(
    state: &AppState<R>,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let view = restored(state).await;
    if view.toggle() {
        write_summary(&view.summary(), out)?;
    } else {
        writeln!(out, "Cart closed")?;
    }
    Ok(())
}

/// Start payment and print the payment link.
///
/// # Errors
///
/// Returns `AppError::NotLoggedIn` without a token, `AppError::EmptyCart`
/// without items, or the remote failure.
pub async fn checkout<R: RemoteSource>(
    state: &AppState<R>,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let view = restored(state).await;
    let auth = TokenAuth::new(state.config().auth_token.clone());
    let redirect = CheckoutLinkRedirect::new(state.config().checkout_url.clone());
    let url = view.checkout(&auth, &redirect).await?;
    writeln!(out, "Complete your payment at: {url}")?;
    Ok(())
}
