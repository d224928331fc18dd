//! Integration tests for Shop Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shop-shop-integration-tests
//! ```
//!
//! No external services are needed: the durable cache lives in a temporary
//! directory, and the remote is either [`ScriptedRemote`] or a local
//! [`FakeGraphQl`] server answering real HTTP.
//!
//! # Test Categories
//!
//! - `offline_cart` - cart survives restarts and outages
//! - `sync_tiers` - memory / remote / cache authority order
//! - `checkout_flow` - checkout and order recording end to end
//! - `http_remote` - the GraphQL client against a local server
//! - `store_properties` - cart invariants under concurrent dispatch
//! - `cart_consistency` - saved cart under concurrent edits and a broken cache

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use shop_shop_core::{
    Category, CategoryId, CategoryRef, CheckoutSessionId, Order, OrderId, OrderItem, Price,
    Product, ProductId,
};
use shop_shop_storefront::config::ShopConfig;
use shop_shop_storefront::remote::{RemoteFault, RemoteSource};
use shop_shop_storefront::state::AppState;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::watch;
use url::Url;

// =============================================================================
// Fixtures
// =============================================================================

#[must_use]
pub fn product(id: &str, cents: u32, category: Option<&str>) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: format!("All about {id}"),
        image: format!("{id}.jpg"),
        price: Price::from_cents(cents),
        quantity: 20,
        category: category.map(|c| CategoryRef {
            id: CategoryId::new(c),
            name: None,
        }),
    }
}

#[must_use]
pub fn category(id: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: format!("Category {id}"),
    }
}

/// A small catalog: two categories, three products.
#[must_use]
pub fn catalog() -> (Vec<Category>, Vec<Product>) {
    (
        vec![category("food"), category("household")],
        vec![
            product("cookies", 299, Some("food")),
            product("coffee", 399, Some("food")),
            product("soap", 1_000, Some("household")),
        ],
    )
}

// =============================================================================
// ScriptedRemote
// =============================================================================

/// Remote whose availability can be switched during a test.
pub struct ScriptedRemote {
    categories: Vec<Category>,
    products: Vec<Product>,
    online: AtomicBool,
    session: Option<CheckoutSessionId>,
    fetches: AtomicUsize,
    orders: Mutex<Vec<Vec<ProductId>>>,
    checkouts: Mutex<Vec<Vec<ProductId>>>,
}

impl ScriptedRemote {
    /// An online remote serving [`catalog`].
    #[must_use]
    pub fn online() -> Self {
        let (categories, products) = catalog();
        Self {
            categories,
            products,
            online: AtomicBool::new(true),
            session: Some(CheckoutSessionId::new("cs_test_integration")),
            fetches: AtomicUsize::new(0),
            orders: Mutex::new(Vec::new()),
            checkouts: Mutex::new(Vec::new()),
        }
    }

    /// A remote that fails every call.
    #[must_use]
    pub fn offline() -> Self {
        let remote = Self::online();
        remote.set_online(false);
        remote
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn submitted_orders(&self) -> Vec<Vec<ProductId>> {
        self.orders.lock().map(|o| o.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn requested_checkouts(&self) -> Vec<Vec<ProductId>> {
        self.checkouts.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn check_online(&self) -> Result<(), RemoteFault> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RemoteFault::Unavailable("connection refused".to_string()))
        }
    }
}

impl RemoteSource for ScriptedRemote {
    async fn fetch_categories(&self) -> Result<Vec<Category>, RemoteFault> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.categories.clone())
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, RemoteFault> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.products.clone())
    }

    async fn submit_order(&self, products: &[ProductId]) -> Result<Order, RemoteFault> {
        self.check_online()?;
        if let Ok(mut orders) = self.orders.lock() {
            orders.push(products.to_vec());
        }
        Ok(Order {
            id: OrderId::new("order-integration"),
            purchase_date: None,
            products: products
                .iter()
                .map(|id| OrderItem {
                    id: id.clone(),
                    name: String::new(),
                })
                .collect(),
        })
    }

    async fn create_checkout_session(
        &self,
        products: &[ProductId],
    ) -> Result<CheckoutSessionId, RemoteFault> {
        self.check_online()?;
        if let Ok(mut checkouts) = self.checkouts.lock() {
            checkouts.push(products.to_vec());
        }
        self.session
            .clone()
            .ok_or_else(|| RemoteFault::Unavailable("no session".to_string()))
    }
}

// =============================================================================
// TestContext
// =============================================================================

/// A cache file in a temporary directory that outlives individual
/// [`AppState`]s, so tests can simulate process restarts.
pub struct TestContext {
    _dir: TempDir,
    pub cache_path: PathBuf,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("temp dir: {e}"));
        let cache_path = dir.path().join("shop-shop.db");
        Self {
            _dir: dir,
            cache_path,
        }
    }

    /// Configuration pointing at this context's cache file.
    #[must_use]
    pub fn config(&self, auth_token: Option<&str>) -> ShopConfig {
        let cache_path = self.cache_path.to_string_lossy().into_owned();
        let token = auth_token.map(str::to_string);
        let mut config = ShopConfig::from_lookup(|key| match key {
            "SHOP_CACHE_PATH" => Some(cache_path.clone()),
            "SHOP_AUTH_TOKEN" => token.clone(),
            _ => None,
        })
        .unwrap_or_else(|e| panic!("test config: {e}"));
        config.remote_timeout = Duration::from_millis(500);
        config
    }

    /// Start a fresh "process": new store, same cache file.
    #[must_use]
    pub fn start<R: RemoteSource>(&self, remote: R) -> AppState<R> {
        AppState::open(self.config(None), remote)
    }

    /// Like [`Self::start`], with a logged-in shopper.
    #[must_use]
    pub fn start_logged_in<R: RemoteSource>(&self, remote: R) -> AppState<R> {
        AppState::open(
            self.config(Some("eyJhbGciOiJIUzI1NiJ9.e30.integration")),
            remote,
        )
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FakeGraphQl
// =============================================================================

/// A request received by [`FakeGraphQl`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    response: Arc<Value>,
    requests: Arc<tokio::sync::Mutex<Vec<RecordedRequest>>>,
}

/// Local GraphQL endpoint answering every POST with one canned response.
pub struct FakeGraphQl {
    pub url: Url,
    state: FakeState,
    shutdown: watch::Sender<bool>,
}

impl FakeGraphQl {
    /// Serve `body` with `status` on an ephemeral local port.
    pub async fn start(status: u16, body: Value) -> Self {
        let state = FakeState {
            status: StatusCode::from_u16(status)
                .unwrap_or_else(|e| panic!("status {status}: {e}")),
            response: Arc::new(body),
            requests: Arc::new(tokio::sync::Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/graphql", post(answer))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("bind fake server: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("local addr: {e}"));
        let url = Url::parse(&format!("http://{addr}/graphql"))
            .unwrap_or_else(|e| panic!("server url: {e}"));

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        Self {
            url,
            state,
            shutdown,
        }
    }

    /// Every request received so far.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }
}

impl Drop for FakeGraphQl {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn answer(
    State(state): State<FakeState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.requests.lock().await.push(RecordedRequest {
        authorization,
        body,
    });
    (state.status, Json(state.response.as_ref().clone()))
}
