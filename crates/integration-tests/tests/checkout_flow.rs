//! Checkout, payment redirect, and order recording.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use shop_shop_core::{CartLine, ProductId};
use shop_shop_integration_tests::{ScriptedRemote, TestContext};
use shop_shop_storefront::error::AppError;
use shop_shop_storefront::services::{CheckoutLinkRedirect, TokenAuth};
use shop_shop_storefront::views::{CartView, CatalogView, OrderSuccess};

fn signed_in() -> TokenAuth {
    TokenAuth::new(Some(SecretString::from("eyJhbGciOiJIUzI1NiJ9.e30.flow")))
}

#[tokio::test]
async fn checkout_then_order_after_redirect() {
    let ctx = TestContext::new();

    // Shopper fills the cart and pays.
    let shopping = ctx.start_logged_in(ScriptedRemote::online());
    let catalog = CatalogView::new(shopping.sync());
    catalog.activate().await;
    catalog.add_to_cart(&ProductId::new("coffee")).await.unwrap();
    catalog.add_to_cart(&ProductId::new("coffee")).await.unwrap();
    catalog.add_to_cart(&ProductId::new("soap")).await.unwrap();

    let redirect = CheckoutLinkRedirect::new(shopping.config().checkout_url.clone());
    let url = CartView::new(shopping.sync())
        .checkout(&signed_in(), &redirect)
        .await
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://checkout.stripe.com/pay/cs_test_integration"
    );
    assert_eq!(
        shopping.remote().requested_checkouts(),
        vec![vec![
            ProductId::new("coffee"),
            ProductId::new("coffee"),
            ProductId::new("soap"),
        ]]
    );
    shopping.shutdown().await;

    // The payment provider sends the shopper back to a new session.
    let returning = ctx.start_logged_in(ScriptedRemote::online());
    let order = OrderSuccess::new(returning.sync())
        .complete()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.products.len(), 2);
    assert_eq!(
        returning.remote().submitted_orders(),
        vec![vec![ProductId::new("coffee"), ProductId::new("soap")]]
    );

    let left: Vec<CartLine> = returning.cache().get_all().await.unwrap();
    assert!(left.is_empty());
    assert!(returning.store().get_state().cart.is_empty());
}

#[tokio::test]
async fn order_failure_keeps_the_cart() {
    let ctx = TestContext::new();

    let state = ctx.start(ScriptedRemote::online());
    let catalog = CatalogView::new(state.sync());
    catalog.activate().await;
    catalog.add_to_cart(&ProductId::new("cookies")).await.unwrap();
    state.remote().set_online(false);

    let err = OrderSuccess::new(state.sync()).complete().await.unwrap_err();
    assert!(matches!(err, AppError::Remote(_)));

    let saved: Vec<CartLine> = state.cache().get_all().await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(state.store().get_state().cart.len(), 1);
}

#[tokio::test]
async fn order_with_nothing_saved_is_a_no_op() {
    let ctx = TestContext::new();
    let state = ctx.start(ScriptedRemote::online());

    let order = OrderSuccess::new(state.sync()).complete().await.unwrap();
    assert!(order.is_none());
    assert!(state.remote().submitted_orders().is_empty());
}

#[tokio::test]
async fn checkout_requires_login_before_contacting_remote() {
    let ctx = TestContext::new();
    let state = ctx.start(ScriptedRemote::online());
    let catalog = CatalogView::new(state.sync());
    catalog.activate().await;
    catalog.add_to_cart(&ProductId::new("soap")).await.unwrap();

    let redirect = CheckoutLinkRedirect::new(state.config().checkout_url.clone());
    let err = CartView::new(state.sync())
        .checkout(&TokenAuth::new(None), &redirect)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotLoggedIn));
    assert!(state.remote().requested_checkouts().is_empty());
}

#[tokio::test]
async fn checkout_outage_surfaces_as_remote_error() {
    let ctx = TestContext::new();
    let state = ctx.start_logged_in(ScriptedRemote::online());
    let catalog = CatalogView::new(state.sync());
    catalog.activate().await;
    catalog.add_to_cart(&ProductId::new("soap")).await.unwrap();
    state.remote().set_online(false);

    let redirect = CheckoutLinkRedirect::new(state.config().checkout_url.clone());
    let err = CartView::new(state.sync())
        .checkout(&signed_in(), &redirect)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Remote(_)));
    assert_eq!(
        err.user_message(),
        "The shop is unreachable, please try again later"
    );
}
