//! Item lifecycle engine.
//!
//! ```text
//!            create
//!              │
//!              ▼
//!          CREATED ──update──▶ UPDATED ◀──update── (any state)
//!              │                  │
//!              └──prepare─┬───────┘
//!                         ▼
//!                  READY_TO_CLOSE ──close──▶ CLOSED
//! ```
//!
//! Every transition is a pure function: it takes the current item by value and
//! the timestamp to stamp, and returns the next item or a `LifecycleError`.
//! Which (status, operation) pairs are legal is decided in one place,
//! `ItemStatus::transition`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use itemflow_core::ItemId;

use crate::item::{Item, ItemStatus, NewItem};

/// Operations that act on an existing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Update,
    PrepareForClosing,
    Close,
}

impl ItemStatus {
    /// Transition table: the status reached by applying `op` from `self`, or
    /// `None` when the operation's guard rejects the current status.
    pub fn transition(self, op: Operation) -> Option<ItemStatus> {
        use ItemStatus::*;

        match (self, op) {
            // Editing is allowed from every state, including CLOSED.
            (_, Operation::Update) => Some(Updated),

            (Created | Updated, Operation::PrepareForClosing) => Some(ReadyToClose),
            (ReadyToClose | Closed, Operation::PrepareForClosing) => None,

            (ReadyToClose, Operation::Close) => Some(Closed),
            (Created | Updated | Closed, Operation::Close) => None,
        }
    }
}

/// Command: UpdateItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub name: String,
    pub number: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCommand {
    Update(UpdateItem),
    PrepareForClosing,
    Close,
}

impl ItemCommand {
    pub fn operation(&self) -> Operation {
        match self {
            ItemCommand::Update(_) => Operation::Update,
            ItemCommand::PrepareForClosing => Operation::PrepareForClosing,
            ItemCommand::Close => Operation::Close,
        }
    }
}

/// A guarded transition was requested from a status that does not allow it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("MyItem with id={0} is already prepared for closing or closed (wrong status)")]
    AlreadyPreparedOrClosed(ItemId),

    #[error("MyItem with id={0} can't be closed (wrong status)")]
    CannotClose(ItemId),
}

impl LifecycleError {
    pub fn item_id(&self) -> ItemId {
        match self {
            LifecycleError::AlreadyPreparedOrClosed(id) | LifecycleError::CannotClose(id) => *id,
        }
    }

    fn rejected(op: Operation, id: ItemId) -> Self {
        match op {
            Operation::Close => LifecycleError::CannotClose(id),
            Operation::PrepareForClosing | Operation::Update => {
                LifecycleError::AlreadyPreparedOrClosed(id)
            }
        }
    }
}

/// Build a fresh record. The store assigns its id on insert.
pub fn create(name: impl Into<String>, number: i32, at: DateTime<Utc>) -> NewItem {
    NewItem {
        name: name.into(),
        number,
        status: ItemStatus::Created,
        last_changed_at: at,
    }
}

/// Apply a command to an existing item.
pub fn apply(item: Item, command: ItemCommand, at: DateTime<Utc>) -> Result<Item, LifecycleError> {
    let op = command.operation();
    let next = item
        .status()
        .transition(op)
        .ok_or_else(|| LifecycleError::rejected(op, item.id()))?;

    let (name, number) = match command {
        ItemCommand::Update(UpdateItem { name, number }) => (name, number),
        ItemCommand::PrepareForClosing | ItemCommand::Close => {
            (item.name().to_string(), item.number())
        }
    };

    Ok(item.with_state(name, number, next, at))
}

/// Replace name and number. The table accepts `Update` from every status, so
/// this only fails if that rule changes.
pub fn apply_update(
    item: Item,
    name: impl Into<String>,
    number: i32,
    at: DateTime<Utc>,
) -> Result<Item, LifecycleError> {
    let update = UpdateItem {
        name: name.into(),
        number,
    };
    apply(item, ItemCommand::Update(update), at)
}

pub fn prepare_for_closing(item: Item, at: DateTime<Utc>) -> Result<Item, LifecycleError> {
    apply(item, ItemCommand::PrepareForClosing, at)
}

pub fn close(item: Item, at: DateTime<Utc>) -> Result<Item, LifecycleError> {
    apply(item, ItemCommand::Close, at)
}
