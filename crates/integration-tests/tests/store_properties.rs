//! Cart invariants hold under concurrent dispatch.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use shop_shop_core::ProductId;
use shop_shop_integration_tests::product;
use shop_shop_storefront::store::{Action, Store};
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_keep_lines_unique() {
    let store = Store::default();
    let mut tasks = JoinSet::new();
    for i in 0..64 {
        let store = store.clone();
        tasks.spawn(async move {
            let id = format!("p{}", i % 8);
            store.dispatch(Action::AddToCart {
                product: product(&id, 100, None),
                purchase_quantity: 1,
            });
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    let state = store.get_state();
    assert_eq!(state.cart.len(), 8);
    let ids: HashSet<&ProductId> = state.cart.iter().map(|line| &line.id).collect();
    assert_eq!(ids.len(), 8);
    assert!(state.cart.iter().all(|line| line.purchase_quantity == 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_toggles_are_all_applied() {
    let store = Store::default();
    let mut tasks = JoinSet::new();
    for _ in 0..100 {
        let store = store.clone();
        tasks.spawn(async move { store.dispatch(Action::ToggleCartOpen) });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    // An even number of flips lands back where it started.
    assert!(!store.get_state().cart_open);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_line_ever_reaches_zero() {
    let store = Store::default();
    store.dispatch(Action::AddToCart {
        product: product("p1", 100, None),
        purchase_quantity: 3,
    });

    let mut tasks = JoinSet::new();
    for quantity in -5_i64..=5 {
        let store = store.clone();
        tasks.spawn(async move {
            store.dispatch(Action::UpdateCartQuantity {
                id: ProductId::new("p1"),
                purchase_quantity: quantity,
            });
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    let state = store.get_state();
    assert_eq!(state.cart.len(), 1);
    assert!(state.cart.iter().all(|line| line.purchase_quantity > 0));
}

#[tokio::test]
async fn subscribers_see_each_change_and_skip_no_ops() {
    let store = Store::default();
    let mut rx = store.subscribe();

    store.dispatch(Action::AddToCart {
        product: product("p1", 250, None),
        purchase_quantity: 2,
    });
    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone();
    assert_eq!(seen.cart_item_count(), 2);
    assert!(seen.cart_open);

    // A duplicate add changes nothing and wakes nobody.
    store.dispatch(Action::AddToCart {
        product: product("p1", 250, None),
        purchase_quantity: 1,
    });
    assert!(!rx.has_changed().unwrap());

    store.dispatch(Action::RemoveFromCart {
        id: ProductId::new("p1"),
        purchase_quantity: 0,
    });
    rx.changed().await.unwrap();
    let seen = rx.borrow_and_update().clone();
    assert!(seen.cart.is_empty());
    assert!(!seen.cart_open);
}
