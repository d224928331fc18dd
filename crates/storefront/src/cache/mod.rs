//! Durable local cache backed by `SQLite`.
//!
//! # Collections
//!
//! - `products` - last catalog seen from the remote source
//! - `categories` - last category list seen from the remote source
//! - `cart` - the shopper's cart, restored after a restart
//!
//! Each collection is a table keyed by record ID, holding the record as JSON.
//!
//! # Schema
//!
//! Tables are created lazily on the first operation. `PRAGMA user_version`
//! records [`SCHEMA_VERSION`]; when it already matches, creation is skipped.
//! Overlapping writers are serialized by `SQLite` transactions (WAL journal,
//! busy timeout), so concurrent `put`/`get_all` calls never see torn state.

mod record;

pub use record::{CacheRecord, Collection};

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

/// Version of the table layout. Bump when the layout changes.
pub const SCHEMA_VERSION: i64 = 1;

/// Errors raised by the durable cache.
#[derive(Debug, Error)]
pub enum StorageFault {
    /// The medium could not be reached or rejected the operation.
    #[error("cache medium unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    /// A stored record no longer decodes.
    #[error("corrupt record {id} in {collection}: {source}")]
    Corrupt {
        collection: Collection,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded for storage.
    #[error("cannot encode record {id} for {collection}: {source}")]
    Encode {
        collection: Collection,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The file was written by a newer schema.
    #[error("cache schema version {found} is newer than supported version {}", SCHEMA_VERSION)]
    Schema { found: i64 },
}

/// Handle to the durable cache.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct LocalCache {
    inner: Arc<LocalCacheInner>,
}

struct LocalCacheInner {
    pool: SqlitePool,
    schema: OnceCell<()>,
}

impl LocalCache {
    /// Open (or create) a cache file.
    ///
    /// Nothing touches the file until the first operation, so an unreachable
    /// medium surfaces as `StorageFault::Unavailable` from that operation.
    #[must_use]
    pub fn open(path: impl AsRef<Path>) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_lazy_with(options);

        info!(path = %path.as_ref().display(), "Opened durable cache");
        Self::from_pool(pool)
    }

    /// Open a private in-memory cache. Contents vanish when the last clone is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns `StorageFault::Unavailable` if `SQLite` cannot be initialised.
    pub async fn in_memory() -> Result<Self, StorageFault> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // Every in-memory connection is its own database, so pin exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            inner: Arc::new(LocalCacheInner {
                pool,
                schema: OnceCell::new(),
            }),
        }
    }

    /// Upsert one record by its key and return it.
    ///
    /// # Errors
    ///
    /// Returns `StorageFault` if the medium is unavailable or the record
    /// cannot be encoded.
    #[instrument(skip(self, record), fields(collection = %R::COLLECTION, id = %record.key()))]
    pub async fn put<R: CacheRecord + Clone>(&self, record: &R) -> Result<R, StorageFault> {
        self.ensure_schema().await?;
        let mut conn = self.inner.pool.acquire().await?;
        upsert(&mut conn, record).await?;
        Ok(record.clone())
    }

    /// Upsert a batch of records in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageFault` if any write fails; nothing is committed then.
    #[instrument(skip(self, records), fields(collection = %R::COLLECTION, count = records.len()))]
    pub async fn put_all<R: CacheRecord>(&self, records: &[R]) -> Result<(), StorageFault> {
        self.ensure_schema().await?;
        let mut tx = self.inner.pool.begin().await?;
        for record in records {
            upsert(&mut tx, record).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Every record in the record type's collection, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageFault::Unavailable` if the read fails or
    /// `StorageFault::Corrupt` if a stored record no longer decodes.
    #[instrument(skip(self), fields(collection = %R::COLLECTION))]
    pub async fn get_all<R: CacheRecord>(&self) -> Result<Vec<R>, StorageFault> {
        self.ensure_schema().await?;
        let sql = format!("SELECT id, data FROM {} ORDER BY rowid", R::COLLECTION.table());
        let rows: Vec<(String, String)> = sqlx::query_as(&sql)
            .fetch_all(&self.inner.pool)
            .await?;

        let records = rows
            .into_iter()
            .map(|(id, data)| {
                serde_json::from_str(&data).map_err(|source| StorageFault::Corrupt {
                    collection: R::COLLECTION,
                    id,
                    source,
                })
            })
            .collect::<Result<Vec<R>, _>>()?;

        debug!(count = records.len(), "Read collection");
        Ok(records)
    }

    /// Delete a record.
    ///
    /// For records that carry a remaining quantity (cart lines), a positive
    /// quantity replaces the stored record instead. Deleting an absent key is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageFault` if the medium is unavailable.
    #[instrument(skip(self, record), fields(collection = %R::COLLECTION, id = %record.key()))]
    pub async fn delete<R: CacheRecord>(&self, record: &R) -> Result<(), StorageFault> {
        self.ensure_schema().await?;
        let mut conn = self.inner.pool.acquire().await?;

        if record.remaining_quantity().is_some_and(|quantity| quantity > 0) {
            return upsert(&mut conn, record).await;
        }

        let sql = format!("DELETE FROM {} WHERE id = ?1", R::COLLECTION.table());
        sqlx::query(&sql)
            .bind(record.key())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Remove every record from the record type's collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageFault` if the medium is unavailable.
    #[instrument(skip(self), fields(collection = %R::COLLECTION))]
    pub async fn clear<R: CacheRecord>(&self) -> Result<(), StorageFault> {
        self.ensure_schema().await?;
        let sql = format!("DELETE FROM {}", R::COLLECTION.table());
        sqlx::query(&sql).execute(&self.inner.pool).await?;
        Ok(())
    }

    /// Number of records in a collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageFault` if the medium is unavailable.
    pub async fn count(&self, collection: Collection) -> Result<i64, StorageFault> {
        self.ensure_schema().await?;
        let sql = format!("SELECT COUNT(*) FROM {}", collection.table());
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.inner.pool)
            .await?;
        Ok(count)
    }

    /// Close the underlying pool. Later operations fail with
    /// `StorageFault::Unavailable`.
    pub async fn close(&self) {
        self.inner.pool.close().await;
    }

    async fn ensure_schema(&self) -> Result<(), StorageFault> {
        self.inner
            .schema
            .get_or_try_init(|| create_schema(&self.inner.pool))
            .await?;
        Ok(())
    }
}

/// Create the collection tables unless the stored version already matches.
async fn create_schema(pool: &SqlitePool) -> Result<(), StorageFault> {
    let mut tx = pool.begin().await?;

    let found: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(&mut *tx)
        .await?;

    if found == SCHEMA_VERSION {
        debug!(version = found, "Cache schema up to date");
        return Ok(());
    }
    if found > SCHEMA_VERSION {
        return Err(StorageFault::Schema { found });
    }

    for collection in Collection::ALL {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY NOT NULL, data TEXT NOT NULL)",
            collection.table()
        );
        sqlx::query(&sql).execute(&mut *tx).await?;
    }

    let sql = format!("PRAGMA user_version = {SCHEMA_VERSION}");
    sqlx::query(&sql).execute(&mut *tx).await?;
    tx.commit().await?;

    info!(version = SCHEMA_VERSION, "Created cache schema");
    Ok(())
}

async fn upsert<R: CacheRecord>(
    conn: &mut SqliteConnection,
    record: &R,
) -> Result<(), StorageFault> {
    let data = serde_json::to_string(record).map_err(|source| StorageFault::Encode {
        collection: R::COLLECTION,
        id: record.key().to_owned(),
        source,
    })?;

    let sql = format!(
        "INSERT INTO {} (id, data) VALUES (?1, ?2) \
         ON CONFLICT(id) DO UPDATE SET data = excluded.data",
        R::COLLECTION.table()
    );
    sqlx::query(&sql)
        .bind(record.key())
        .bind(data)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
