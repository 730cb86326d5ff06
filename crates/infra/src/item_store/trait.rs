use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use itemflow_core::ItemId;
use itemflow_items::{Item, NewItem};

/// Item store operation error.
///
/// These are **infrastructure errors** (connectivity, corrupt rows) as opposed
/// to lifecycle errors. A missing item is not an error at this level: `get`
/// returns `Ok(None)` and the service decides what absence means.
#[derive(Debug, Error)]
pub enum ItemStoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt item row: {0}")]
    Corrupt(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Durable key/value persistence for items, keyed by a store-generated id.
///
/// ## Contract
///
/// - `insert` assigns a fresh id that has never been handed out before.
/// - `get` returns exactly one item or `None`.
/// - `upsert` writes the whole record under its id (last write wins; there is
///   no version check).
/// - `clear` removes every item. Not reachable from the HTTP surface; it exists
///   for test isolation and local resets.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get(&self, id: ItemId) -> Result<Option<Item>, ItemStoreError>;

    async fn insert(&self, item: NewItem) -> Result<Item, ItemStoreError>;

    async fn upsert(&self, item: Item) -> Result<Item, ItemStoreError>;

    /// Delete all items, returning how many were removed.
    async fn clear(&self) -> Result<u64, ItemStoreError>;
}

#[async_trait]
impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    async fn get(&self, id: ItemId) -> Result<Option<Item>, ItemStoreError> {
        (**self).get(id).await
    }

    async fn insert(&self, item: NewItem) -> Result<Item, ItemStoreError> {
        (**self).insert(item).await
    }

    async fn upsert(&self, item: Item) -> Result<Item, ItemStoreError> {
        (**self).upsert(item).await
    }

    async fn clear(&self) -> Result<u64, ItemStoreError> {
        (**self).clear().await
    }
}
