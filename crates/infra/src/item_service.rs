//! Item use cases (application-level orchestration).
//!
//! Every id-bearing use case runs the same pipeline:
//!
//! ```text
//! id
//!  ↓
//! 1. Load the item from the store (absent → NotFound)
//!  ↓
//! 2. Apply the lifecycle transition at clock.now() (guard fails → InvalidTransition)
//!  ↓
//! 3. Persist the new item (upsert)
//! ```
//!
//! Nothing is written when step 1 or 2 fails. Steps 1 and 3 are separate store
//! calls, so two concurrent requests for the same id can both pass the guard
//! and the later write wins. There is no version check at the store boundary.

use thiserror::Error;
use tracing::instrument;

use itemflow_core::{Clock, ItemId};
use itemflow_items::{lifecycle, Item, ItemCommand, LifecycleError, UpdateItem};

use crate::item_store::{ItemStore, ItemStoreError};

#[derive(Debug, Error)]
pub enum ItemServiceError {
    /// No item stored under the requested id.
    #[error("MyItem with id={0} doesn't exist")]
    NotFound(ItemId),

    /// The item's status does not allow the requested transition.
    #[error(transparent)]
    InvalidTransition(#[from] LifecycleError),

    /// The store failed; the operation may or may not have been persisted.
    #[error(transparent)]
    Store(#[from] ItemStoreError),
}

/// Composes a store, a clock and the lifecycle engine.
#[derive(Debug, Clone)]
pub struct ItemService<S, C> {
    store: S,
    clock: C,
}

impl<S, C> ItemService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S, C> ItemService<S, C>
where
    S: ItemStore,
    C: Clock,
{
    #[instrument(skip(self, name))]
    pub async fn create(&self, name: String, number: i32) -> Result<Item, ItemServiceError> {
        let draft = lifecycle::create(name, number, self.clock.now());
        let item = self.store.insert(draft).await?;

        tracing::info!(item_id = %item.id(), status = %item.status(), "item created");
        Ok(item)
    }

    #[instrument(skip(self, id, name), fields(item_id = %id))]
    pub async fn update(&self, id: ItemId, name: String, number: i32) -> Result<Item, ItemServiceError> {
        self.transition(id, ItemCommand::Update(UpdateItem { name, number }))
            .await
    }

    #[instrument(skip(self, id), fields(item_id = %id))]
    pub async fn get(&self, id: ItemId) -> Result<Item, ItemServiceError> {
        self.fetch(id).await
    }

    #[instrument(skip(self, id), fields(item_id = %id))]
    pub async fn prepare_for_closing(&self, id: ItemId) -> Result<Item, ItemServiceError> {
        self.transition(id, ItemCommand::PrepareForClosing).await
    }

    #[instrument(skip(self, id), fields(item_id = %id))]
    pub async fn close(&self, id: ItemId) -> Result<Item, ItemServiceError> {
        self.transition(id, ItemCommand::Close).await
    }

    async fn fetch(&self, id: ItemId) -> Result<Item, ItemServiceError> {
        match self.store.get(id).await? {
            Some(item) => Ok(item),
            None => {
                tracing::debug!(item_id = %id, "item not found");
                Err(ItemServiceError::NotFound(id))
            }
        }
    }

    async fn transition(&self, id: ItemId, command: ItemCommand) -> Result<Item, ItemServiceError> {
        let item = self.fetch(id).await?;
        let from = item.status();
        let op = command.operation();

        let next = lifecycle::apply(item, command, self.clock.now()).inspect_err(|err| {
            tracing::warn!(item_id = %id, status = %from, ?op, error = %err, "transition rejected");
        })?;

        let saved = self.store.upsert(next).await?;
        tracing::info!(item_id = %id, from = %from, to = %saved.status(), ?op, "item transitioned");
        Ok(saved)
    }
}
