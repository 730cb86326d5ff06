//! Item domain module.
//!
//! This crate contains the item record and its lifecycle rules, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). Callers
//! supply the timestamp for every transition.

pub mod item;
pub mod lifecycle;

pub use item::{Item, ItemStatus, ItemView, NewItem};
pub use lifecycle::{ItemCommand, LifecycleError, Operation, UpdateItem};
