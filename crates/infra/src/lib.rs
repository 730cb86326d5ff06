//! Infrastructure layer: item persistence, use-case orchestration, config.

pub mod config;
pub mod item_service;
pub mod item_store;


pub use config::{StoreBackend, StoreConfig};
pub use item_service::{ItemService, ItemServiceError};
pub use item_store::{InMemoryItemStore, ItemStore, ItemStoreError, PostgresItemStore};
