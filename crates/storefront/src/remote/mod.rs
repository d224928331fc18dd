//! Remote source of truth for catalog data and orders.
//!
//! # Architecture
//!
//! - [`RemoteSource`] is the seam the sync policy and views depend on
//! - [`HttpRemote`] talks GraphQL over HTTP with `reqwest`
//! - [`OfflineRemote`] fails every call, so every read falls back to the
//!   durable cache
//!
//! "Still pending" is expressed by the returned future not having completed.
//! A completed call either carries data or a [`RemoteFault`].

mod http;
pub mod queries;

pub use http::HttpRemote;

use std::future::Future;
use std::time::Duration;

use shop_shop_core::{Category, CheckoutSessionId, Order, Product, ProductId};
use thiserror::Error;

/// Errors that can occur when talking to the remote source.
#[derive(Debug, Error)]
pub enum RemoteFault {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The query returned errors.
    #[error("GraphQL errors: {}", format_messages(.0))]
    GraphQL(Vec<String>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The call did not complete in time.
    #[error("remote call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The remote is not reachable or returned no data.
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    /// The remote rejected our credentials.
    #[error("unauthorized")]
    Unauthorized,
}

fn format_messages(messages: &[String]) -> String {
    if messages.is_empty() {
        return "(no error details provided)".to_string();
    }
    messages.join("; ")
}

/// Capability set of the remote source.
///
/// Futures are `Send` so callers can race them or move them onto tasks.
pub trait RemoteSource: Send + Sync {
    /// Every category.
    fn fetch_categories(&self)
    -> impl Future<Output = Result<Vec<Category>, RemoteFault>> + Send;

    /// Every product.
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Product>, RemoteFault>> + Send;

    /// Record an order for the given products.
    fn submit_order(
        &self,
        products: &[ProductId],
    ) -> impl Future<Output = Result<Order, RemoteFault>> + Send;

    /// Start a payment session for the given products (one ID per unit).
    fn create_checkout_session(
        &self,
        products: &[ProductId],
    ) -> impl Future<Output = Result<CheckoutSessionId, RemoteFault>> + Send;
}

/// A remote that is never reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRemote;

impl OfflineRemote {
    fn unavailable<T>() -> Result<T, RemoteFault> {
        Err(RemoteFault::Unavailable(
            "no remote endpoint configured".to_string(),
        ))
    }
}

impl RemoteSource for OfflineRemote {
    async fn fetch_categories(&self) -> Result<Vec<Category>, RemoteFault> {
        Self::unavailable()
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, RemoteFault> {
        Self::unavailable()
    }

    async fn submit_order(&self, _products: &[ProductId]) -> Result<Order, RemoteFault> {
        Self::unavailable()
    }

    async fn create_checkout_session(
        &self,
        _products: &[ProductId],
    ) -> Result<CheckoutSessionId, RemoteFault> {
        Self::unavailable()
    }
}
