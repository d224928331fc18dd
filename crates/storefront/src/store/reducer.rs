//! The transition function.
//!
//! [`reduce`] is total and pure: it never fails, never suspends, and never
//! touches its input. Collections that change are rebuilt into a fresh `Arc`;
//! untouched ones are shared with the previous state.

use std::collections::HashSet;
use std::sync::Arc;

use shop_shop_core::{CartLine, ProductId};

use super::{Action, StoreState};

/// Apply one action to a state, producing the next state.
///
/// Requests that would break a cart invariant (a duplicate line, a line at
/// quantity zero) or that target a product not in the cart return an
/// unchanged copy of `state`.
#[must_use]
pub fn reduce(state: &StoreState, action: Action) -> StoreState {
    match action {
        Action::ReplaceProducts { products } => StoreState {
            products: Arc::new(products),
            ..state.clone()
        },

        Action::ReplaceCategories { categories } => StoreState {
            categories: Arc::new(categories),
            ..state.clone()
        },

        Action::SetCurrentCategory { current_category } => StoreState {
            current_category,
            ..state.clone()
        },

        Action::AddToCart {
            product,
            purchase_quantity,
        } => {
            if purchase_quantity == 0 || state.cart_line(&product.id).is_some() {
                return state.clone();
            }
            let cart = state
                .cart
                .iter()
                .cloned()
                .chain(std::iter::once(CartLine::from_product(
                    &product,
                    purchase_quantity,
                )))
                .collect();
            StoreState {
                cart: Arc::new(cart),
                cart_open: true,
                ..state.clone()
            }
        }

        Action::AddMultipleToCart { products } => {
            let mut seen: HashSet<ProductId> =
                state.cart.iter().map(|line| line.id.clone()).collect();
            let added: Vec<CartLine> = products
                .into_iter()
                .filter(|line| line.purchase_quantity > 0 && seen.insert(line.id.clone()))
                .collect();
            if added.is_empty() {
                return state.clone();
            }
            let cart = state.cart.iter().cloned().chain(added).collect();
            StoreState {
                cart: Arc::new(cart),
                ..state.clone()
            }
        }

        Action::UpdateCartQuantity {
            id,
            purchase_quantity,
        } => {
            let Some(quantity) = positive_quantity(purchase_quantity) else {
                return state.clone();
            };
            if state.cart_line(&id).is_none() {
                return state.clone();
            }
            StoreState {
                cart: Arc::new(with_line_quantity(&state.cart, &id, quantity)),
                cart_open: true,
                ..state.clone()
            }
        }

        Action::RemoveFromCart {
            id,
            purchase_quantity,
        } => {
            if state.cart_line(&id).is_none() {
                return state.clone();
            }
            let cart = match positive_quantity(purchase_quantity) {
                Some(quantity) => with_line_quantity(&state.cart, &id, quantity),
                None => state
                    .cart
                    .iter()
                    .filter(|line| line.id != id)
                    .cloned()
                    .collect(),
            };
            let cart_open = !cart.is_empty();
            StoreState {
                cart: Arc::new(cart),
                cart_open,
                ..state.clone()
            }
        }

        Action::ClearCart => StoreState {
            cart: Arc::new(Vec::new()),
            cart_open: false,
            ..state.clone()
        },

        Action::ToggleCartOpen => StoreState {
            cart_open: !state.cart_open,
            ..state.clone()
        },

        Action::Unrecognized => state.clone(),
    }
}

/// Quantities above `u32::MAX` saturate.
fn positive_quantity(quantity: i64) -> Option<u32> {
    (quantity > 0).then(|| u32::try_from(quantity).unwrap_or(u32::MAX))
}

/// Rebuild the cart with one line's quantity replaced.
fn with_line_quantity(cart: &[CartLine], id: &ProductId, quantity: u32) -> Vec<CartLine> {
    cart.iter()
        .map(|line| {
            if &line.id == id {
                line.with_quantity(quantity)
            } else {
                line.clone()
            }
        })
        .collect()
}
