//! Item persistence boundary.
//!
//! The service only depends on the `ItemStore` trait; the in-memory
//! implementation backs tests and local runs, Postgres backs deployments.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryItemStore;
pub use postgres::PostgresItemStore;
pub use r#trait::{ItemStore, ItemStoreError};
