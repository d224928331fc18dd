//! Category menu and product list.

use std::sync::Arc;

use shop_shop_core::{CartLine, Category, CategoryId, Product, ProductId};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::remote::RemoteSource;
use crate::store::Action;
use crate::sync::{SyncPolicy, SyncSource};

/// Where the catalog's two collections came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLoad {
    pub categories: SyncSource,
    pub products: SyncSource,
}

/// The home screen: category filter plus the matching products.
pub struct CatalogView<'a, R> {
    sync: &'a SyncPolicy<R>,
}

impl<'a, R: RemoteSource> CatalogView<'a, R> {
    #[must_use]
    pub const fn new(sync: &'a SyncPolicy<R>) -> Self {
        Self { sync }
    }

    /// Load categories and products, each through the sync tiers.
    #[instrument(skip(self))]
    pub async fn activate(&self) -> CatalogLoad {
        let (categories, products) =
            tokio::join!(self.sync.sync_categories(), self.sync.sync_products());
        CatalogLoad {
            categories,
            products,
        }
    }

    #[must_use]
    pub fn categories(&self) -> Arc<Vec<Category>> {
        Arc::clone(&self.sync.store().get_state().categories)
    }

    #[must_use]
    pub fn current_category(&self) -> Option<CategoryId> {
        self.sync.store().get_state().current_category.clone()
    }

    /// Filter the product list, or clear the filter with `None`.
    pub fn select_category(&self, category: Option<CategoryId>) {
        self.sync.store().dispatch(Action::SetCurrentCategory {
            current_category: category,
        });
    }

    /// Products in the selected category, or all of them.
    #[must_use]
    pub fn visible_products(&self) -> Vec<Product> {
        self.sync
            .store()
            .get_state()
            .visible_products()
            .cloned()
            .collect()
    }

    /// Add one unit of a listed product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the loaded list.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, id: &ProductId) -> Result<CartLine> {
        let product = self
            .sync
            .store()
            .get_state()
            .product(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
        Ok(super::add_one(self.sync, &product).await)
    }
}
