//! Order commands.

use std::io::Write;

use shop_shop_storefront::remote::RemoteSource;
use shop_shop_storefront::state::AppState;
use shop_shop_storefront::views::OrderSuccess;

use super::CommandError;

/// Record the saved cart as an order.
///
/// # Errors
///
/// Returns the storage or remote failure; the saved cart is kept in that case.
pub async fn complete<R: RemoteSource>(
    state: &AppState<R>,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    match OrderSuccess::new(state.sync()).complete().await? {
        Some(order) => {
            writeln!(out, "Success! Thank you for your purchase!")?;
            writeln!(out, "Order {} ({} products)", order.id, order.products.len())?;
            if let Some(date) = order.purchase_date {
                writeln!(out, "Placed {}", date.format("%Y-%m-%d %H:%M UTC"))?;
            }
        }
        None => writeln!(out, "No saved cart to order")?,
    }
    Ok(())
}
