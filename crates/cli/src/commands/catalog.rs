//! Catalog browsing commands.

use std::io::Write;

use shop_shop_core::{CategoryId, ProductId};
use shop_shop_storefront::format::format_price;
use shop_shop_storefront::remote::RemoteSource;
use shop_shop_storefront::state::AppState;
use shop_shop_storefront::sync::SyncSource;
use shop_shop_storefront::views::{CatalogView, DetailView};
use tracing::{info, warn};

use super::CommandError;

/// List categories and the products in `category` (or all of them).
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub async fn list<R: RemoteSource>(
    state: &AppState<R>,
    category: Option<CategoryId>,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let view = CatalogView::new(state.sync());
    let load = view.activate().await;
    if load.products == SyncSource::Cache {
        warn!("Showing cached catalog, the shop is unreachable");
    }

    let categories = view.categories();
    if let Some(id) = &category
        && !categories.iter().any(|c| &c.id == id)
    {
        warn!(category = %id, "Unknown category");
    }
    view.select_category(category);

    let selected = view.current_category();
    writeln!(out, "Categories:")?;
    for c in categories.as_ref() {
        let marker = if selected.as_ref() == Some(&c.id) {
            "*"
        } else {
            " "
        };
        writeln!(out, " {marker} {} ({})", c.name, c.id)?;
    }

    let products = view.visible_products();
    writeln!(out, "Products:")?;
    if products.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for p in &products {
        writeln!(
            out,
            "  {:<24} {:>10}  {} in stock  [{}]",
            p.name,
            format_price(p.price),
            p.quantity,
            p.id
        )?;
    }

    info!(
        categories = categories.len(),
        products = products.len(),
        "Listed catalog"
    );
    Ok(())
}

/// Show one product and how many of it are in the cart.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product does not exist.
pub async fn show<R: RemoteSource>(
    state: &AppState<R>,
    id: &ProductId,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    state.sync().restore_cart().await;
    let view = DetailView::activate(state.sync(), id).await?;
    let product = view.product();

    writeln!(out, "{}", product.name)?;
    if !product.description.is_empty() {
        writeln!(out, "{}", product.description)?;
    }
    writeln!(
        out,
        "Price: {}  ({} in stock)",
        format_price(product.price),
        product.quantity
    )?;
    match view.cart_line() {
        Some(line) => writeln!(out, "In cart: {}", line.purchase_quantity)?,
        None => writeln!(out, "Not in cart")?,
    }
    Ok(())
}
