//! Application state shared across views.

use std::sync::Arc;

use crate::cache::LocalCache;
use crate::config::ShopConfig;
use crate::remote::RemoteSource;
use crate::store::Store;
use crate::sync::SyncPolicy;

/// Application state shared across all views.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store, the durable cache, the remote source, and configuration.
pub struct AppState<R> {
    inner: Arc<AppStateInner<R>>,
}

struct AppStateInner<R> {
    config: ShopConfig,
    sync: SyncPolicy<R>,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: RemoteSource> AppState<R> {
    /// Build the state around the durable cache named by `config`.
    ///
    /// The cache connects on first use; if its file cannot be opened, each
    /// cache operation fails on its own and the store keeps working in memory.
    #[must_use]
    pub fn open(config: ShopConfig, remote: R) -> Self {
        let cache = LocalCache::open(&config.cache_path);
        Self::new(config, cache, remote)
    }

    /// Create a new application state over an already opened cache.
    #[must_use]
    pub fn new(config: ShopConfig, cache: LocalCache, remote: R) -> Self {
        let sync = SyncPolicy::new(Store::default(), cache, remote, config.remote_timeout);
        Self {
            inner: Arc::new(AppStateInner { config, sync }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.inner.config
    }

    /// Get a reference to the synchronization policy.
    #[must_use]
    pub fn sync(&self) -> &SyncPolicy<R> {
        &self.inner.sync
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &Store {
        self.inner.sync.store()
    }

    /// Get a reference to the durable cache.
    #[must_use]
    pub fn cache(&self) -> &LocalCache {
        self.inner.sync.cache()
    }

    /// Get a reference to the remote source.
    #[must_use]
    pub fn remote(&self) -> &R {
        self.inner.sync.remote()
    }

    /// Wait for background cache writes, then close the cache.
    pub async fn shutdown(&self) {
        self.inner.sync.flush().await;
        self.cache().close().await;
    }
}
