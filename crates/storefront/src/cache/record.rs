//! Collections and the records stored in them.

use core::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use shop_shop_core::{CartLine, Category, Product};

/// A named collection in the durable cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Categories,
    Cart,
}

impl Collection {
    /// Every collection, in creation order.
    pub const ALL: [Self; 3] = [Self::Products, Self::Categories, Self::Cart];

    /// Backing table name.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Cart => "cart",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A record that can live in the durable cache.
///
/// The record type decides its collection, so a product can never be written
/// into the cart table by mistake.
pub trait CacheRecord: Serialize + DeserializeOwned + Send + Sync {
    /// Collection holding records of this type.
    const COLLECTION: Collection;

    /// Primary key.
    fn key(&self) -> &str;

    /// Quantity left after a delete request, for collections where delete
    /// means "delete or replace". `None` means delete always removes.
    fn remaining_quantity(&self) -> Option<i64> {
        None
    }
}

impl CacheRecord for Product {
    const COLLECTION: Collection = Collection::Products;

    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl CacheRecord for Category {
    const COLLECTION: Collection = Collection::Categories;

    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl CacheRecord for CartLine {
    const COLLECTION: Collection = Collection::Cart;

    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn remaining_quantity(&self) -> Option<i64> {
        Some(i64::from(self.purchase_quantity))
    }
}
