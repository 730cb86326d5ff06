use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use itemflow_core::ItemId;
use itemflow_items::{Item, NewItem};

use super::r#trait::{ItemStore, ItemStoreError};

#[derive(Debug, Default)]
struct Inner {
    items: BTreeMap<ItemId, Item>,
    last_id: i64,
}

/// In-memory item store.
///
/// Intended for tests/dev. Ids come from a counter that is never reset, not
/// even by `clear`, so an id is never handed out twice.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    inner: RwLock<Inner>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items. Counting is read-only, so a poisoned lock is
    /// read through instead of being reported.
    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(inner) => inner.items.len(),
            Err(poisoned) => poisoned.into_inner().items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> ItemStoreError {
    ItemStoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get(&self, id: ItemId) -> Result<Option<Item>, ItemStoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.items.get(&id).cloned())
    }

    async fn insert(&self, item: NewItem) -> Result<Item, ItemStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner.last_id += 1;
        let item = item.into_item(ItemId::from_raw(inner.last_id));
        inner.items.insert(item.id(), item.clone());
        Ok(item)
    }

    async fn upsert(&self, item: Item) -> Result<Item, ItemStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        // Keep the counter ahead of ids that arrive from outside.
        inner.last_id = inner.last_id.max(item.id().as_i64());
        inner.items.insert(item.id(), item.clone());
        Ok(item)
    }

    async fn clear(&self) -> Result<u64, ItemStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let removed = inner.items.len() as u64;
        inner.items.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use itemflow_items::ItemStatus;

    fn draft(name: &str) -> NewItem {
        NewItem {
            name: name.to_string(),
            number: 1,
            status: ItemStatus::Created,
            last_changed_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        let store = InMemoryItemStore::new();
        let a = store.insert(draft("a")).await.unwrap();
        let b = store.insert(draft("b")).await.unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(store.get(a.id()).await.unwrap(), Some(a));
        assert_eq!(store.get(b.id()).await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let store = InMemoryItemStore::new();
        assert_eq!(store.get(ItemId::from_raw(12142)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn upsert_overwrites_by_id() {
        let store = InMemoryItemStore::new();
        let item = store.insert(draft("a")).await.unwrap();
        let renamed = itemflow_items::lifecycle::apply_update(item.clone(), "b", 2, item.last_changed_at())
            .unwrap();

        store.upsert(renamed.clone()).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(item.id()).await.unwrap(), Some(renamed));
    }

    #[tokio::test]
    async fn insert_after_upsert_of_unseen_id_gets_a_fresh_id() {
        let store = InMemoryItemStore::new();
        let first = store.insert(draft("a")).await.unwrap();
        store.clear().await.unwrap();

        let foreign = draft("b").into_item(ItemId::from_raw(first.id().as_i64() + 1));
        store.upsert(foreign.clone()).await.unwrap();

        let next = store.insert(draft("c")).await.unwrap();
        assert!(next.id() > foreign.id());
        assert_eq!(store.get(foreign.id()).await.unwrap(), Some(foreign));
    }

    #[test]
    fn len_reads_through_a_poisoned_lock() {
        let store = std::sync::Arc::new(InMemoryItemStore::new());
        let shared = store.clone();
        let _ = std::thread::spawn(move || {
            let mut inner = shared.inner.write().unwrap();
            inner.last_id += 1;
            let item = draft("a").into_item(ItemId::from_raw(inner.last_id));
            inner.items.insert(item.id(), item);
            panic!("poison the lock");
        })
        .join();

        assert!(store.inner.is_poisoned());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_clear() {
        let store = InMemoryItemStore::new();
        let first = store.insert(draft("a")).await.unwrap();

        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(store.is_empty());

        let second = store.insert(draft("b")).await.unwrap();
        assert!(second.id() > first.id());
        assert_eq!(store.get(first.id()).await.unwrap(), None);
    }
}
