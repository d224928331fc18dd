//! Fixtures and a scripted remote for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use shop_shop_core::{
    Category, CategoryId, CategoryRef, CheckoutSessionId, Order, OrderId, OrderItem, Price,
    Product, ProductId,
};

use crate::cache::LocalCache;
use crate::remote::{RemoteFault, RemoteSource};
use crate::store::Store;
use crate::sync::SyncPolicy;

/// A remote whose answers are fixed up front. `None` means unavailable.
#[derive(Default)]
pub struct ScriptedRemote {
    pub products: Option<Vec<Product>>,
    pub categories: Option<Vec<Category>>,
    pub session: Option<CheckoutSessionId>,
    pub accept_orders: bool,
    pub hang: bool,
    pub fetches: AtomicUsize,
    pub orders: Mutex<Vec<Vec<ProductId>>>,
    pub checkouts: Mutex<Vec<Vec<ProductId>>>,
}

impl ScriptedRemote {
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn submitted_orders(&self) -> Vec<Vec<ProductId>> {
        self.orders.lock().map(|o| o.clone()).unwrap_or_default()
    }

    pub fn requested_checkouts(&self) -> Vec<Vec<ProductId>> {
        self.checkouts.lock().map(|c| c.clone()).unwrap_or_default()
    }

    async fn respond<T: Clone + Send + Sync>(
        &self,
        data: Option<&Vec<T>>,
    ) -> Result<Vec<T>, RemoteFault> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        data.cloned()
            .ok_or_else(|| RemoteFault::Unavailable("scripted outage".to_string()))
    }
}

impl RemoteSource for ScriptedRemote {
    async fn fetch_categories(&self) -> Result<Vec<Category>, RemoteFault> {
        self.respond(self.categories.as_ref()).await
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, RemoteFault> {
        self.respond(self.products.as_ref()).await
    }

    async fn submit_order(&self, products: &[ProductId]) -> Result<Order, RemoteFault> {
        if let Ok(mut orders) = self.orders.lock() {
            orders.push(products.to_vec());
        }
        if !self.accept_orders {
            return Err(RemoteFault::Unavailable("scripted outage".to_string()));
        }
        Ok(Order {
            id: OrderId::new("order-1"),
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
        if let Ok(mut checkouts) = self.checkouts.lock() {
            checkouts.push(products.to_vec());
        }
        self.session
            .clone()
            .ok_or_else(|| RemoteFault::Unavailable("scripted outage".to_string()))
    }
}

pub fn product(id: &str, cents: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: String::new(),
        image: format!("{id}.jpg"),
        price: Price::from_cents(cents),
        quantity: 10,
        category: None,
    }
}

pub fn product_in(id: &str, cents: u32, category: &str) -> Product {
    Product {
        category: Some(CategoryRef {
            id: CategoryId::new(category),
            name: None,
        }),
        ..product(id, cents)
    }
}

pub fn category(id: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: format!("Category {id}"),
    }
}

pub async fn sync_with(remote: ScriptedRemote) -> SyncPolicy<ScriptedRemote> {
    let cache = LocalCache::in_memory()
        .await
        .unwrap_or_else(|e| panic!("in-memory cache: {e}"));
    SyncPolicy::new(Store::default(), cache, remote, Duration::from_millis(200))
}
