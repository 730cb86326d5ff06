use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use itemflow_core::{DomainError, ItemId};

/// Item status lifecycle.
///
/// The serialized form is the textual state name (`READY_TO_CLOSE`, ...), which
/// is also what the Postgres store writes into the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Created,
    Updated,
    ReadyToClose,
    Closed,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 4] = [
        ItemStatus::Created,
        ItemStatus::Updated,
        ItemStatus::ReadyToClose,
        ItemStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Created => "CREATED",
            ItemStatus::Updated => "UPDATED",
            ItemStatus::ReadyToClose => "READY_TO_CLOSE",
            ItemStatus::Closed => "CLOSED",
        }
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown item status '{s}'")))
    }
}

/// An item that has not been persisted yet (no id assigned).
///
/// `lifecycle::create` is the only constructor the service uses; stores and
/// test fixtures may build one directly to seed a record in a given status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub number: i32,
    pub status: ItemStatus,
    pub last_changed_at: DateTime<Utc>,
}

impl NewItem {
    /// Attach the store-assigned identifier.
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            name: self.name,
            number: self.number,
            status: self.status,
            last_changed_at: self.last_changed_at,
        }
    }
}

/// The managed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    name: String,
    number: i32,
    status: ItemStatus,
    last_changed_at: DateTime<Utc>,
}

impl Item {
    /// Rebuild an item from persisted columns.
    pub fn restore(
        id: ItemId,
        name: String,
        number: i32,
        status: ItemStatus,
        last_changed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            number,
            status,
            last_changed_at,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn last_changed_at(&self) -> DateTime<Utc> {
        self.last_changed_at
    }

    pub(crate) fn with_state(
        self,
        name: String,
        number: i32,
        status: ItemStatus,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            number,
            status,
            last_changed_at: at,
            ..self
        }
    }
}

/// Outward-facing projection of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub number: i32,
    pub status: String,
    pub last_changed_at: DateTime<Utc>,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            number: item.number,
            status: item.status.as_str().to_string(),
            last_changed_at: item.last_changed_at,
        }
    }
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            number: item.number,
            status: item.status.as_str().to_string(),
            last_changed_at: item.last_changed_at,
        }
    }
}
