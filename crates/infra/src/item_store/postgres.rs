//! Postgres-backed item store.
//!
//! One row per item in `my_item`. The id comes from a `BIGSERIAL` sequence and
//! the status is stored as its textual name, guarded by a CHECK constraint so
//! the column can never hold anything outside the four lifecycle states.
//!
//! ## Error Mapping
//!
//! | SQLx Error | ItemStoreError |
//! |------------|-----------------|
//! | `PoolClosed`, `PoolTimedOut`, `Io` | `Unavailable` |
//! | `Database` (any code) | `Query` |
//! | `ColumnDecode`, `Decode`, unknown status text | `Corrupt` |
//! | anything else | `Query` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{instrument, Span};

use itemflow_core::ItemId;
use itemflow_items::{Item, ItemStatus, NewItem};

use super::r#trait::{ItemStore, ItemStoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS my_item (
    id              BIGSERIAL PRIMARY KEY,
    name            TEXT NOT NULL,
    number          INTEGER NOT NULL,
    status          TEXT NOT NULL
                    CHECK (status IN ('CREATED', 'UPDATED', 'READY_TO_CLOSE', 'CLOSED')),
    last_changed_at TIMESTAMPTZ NOT NULL
)
"#;

/// Moves the id sequence forward to `$1` when `$1` is past everything it has
/// handed out. `pg_sequence_last_value` is NULL until the first `nextval`.
const ADVANCE_ID_SEQUENCE: &str = r#"
SELECT setval(pg_get_serial_sequence('my_item', 'id')::regclass, $1)
WHERE $1 > COALESCE(
    pg_sequence_last_value(pg_get_serial_sequence('my_item', 'id')::regclass),
    0
)
"#;

/// Postgres-backed item store.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; clones share the pool.
#[derive(Debug, Clone)]
pub struct PostgresItemStore {
    pool: Arc<PgPool>,
}

impl PostgresItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect a pool and make sure the table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, ItemStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the `my_item` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), ItemStoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl ItemStore for PostgresItemStore {
    #[instrument(skip(self), fields(item_id = %id, operation), err)]
    async fn get(&self, id: ItemId) -> Result<Option<Item>, ItemStoreError> {
        Span::current().record("operation", "get_item");

        let row = sqlx::query(
            r#"
            SELECT id, name, number, status, last_changed_at
            FROM my_item
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_item", e))?;

        row.map(|r| item_from_row(&r)).transpose()
    }

    #[instrument(skip(self, item), fields(operation), err)]
    async fn insert(&self, item: NewItem) -> Result<Item, ItemStoreError> {
        Span::current().record("operation", "insert_item");

        let row = sqlx::query(
            r#"
            INSERT INTO my_item (name, number, status, last_changed_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&item.name)
        .bind(item.number)
        .bind(item.status.as_str())
        .bind(item.last_changed_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_item", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("insert_item", e))?;

        Ok(item.into_item(ItemId::from_raw(id)))
    }

    #[instrument(skip(self, item), fields(item_id = %item.id(), operation), err)]
    async fn upsert(&self, item: Item) -> Result<Item, ItemStoreError> {
        Span::current().record("operation", "upsert_item");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO my_item (id, name, number, status, last_changed_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                number = EXCLUDED.number,
                status = EXCLUDED.status,
                last_changed_at = EXCLUDED.last_changed_at
            "#,
        )
        .bind(item.id().as_i64())
        .bind(item.name())
        .bind(item.number())
        .bind(item.status().as_str())
        .bind(item.last_changed_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_item", e))?;

        // An id written from outside must never come back out of `insert`.
        sqlx::query(ADVANCE_ID_SEQUENCE)
            .bind(item.id().as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("advance_id_sequence", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(item)
    }

    #[instrument(skip(self), fields(operation), err)]
    async fn clear(&self) -> Result<u64, ItemStoreError> {
        Span::current().record("operation", "clear_items");

        let result = sqlx::query("DELETE FROM my_item")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("clear_items", e))?;

        Ok(result.rows_affected())
    }
}

fn item_from_row(row: &PgRow) -> Result<Item, ItemStoreError> {
    let decode = |e| map_sqlx_error("decode_item", e);

    let id: i64 = row.try_get("id").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let number: i32 = row.try_get("number").map_err(decode)?;
    let status: String = row.try_get("status").map_err(decode)?;
    let last_changed_at: DateTime<Utc> = row.try_get("last_changed_at").map_err(decode)?;

    let status: ItemStatus = status
        .parse()
        .map_err(|e| ItemStoreError::Corrupt(format!("item {id}: {e}")))?;

    Ok(Item::restore(
        ItemId::from_raw(id),
        name,
        number,
        status,
        last_changed_at,
    ))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> ItemStoreError {
    match err {
        sqlx::Error::PoolClosed => {
            ItemStoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            ItemStoreError::Unavailable(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::Io(e) => ItemStoreError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            ItemStoreError::Corrupt(format!("decode error in {operation}: {err}"))
        }
        sqlx::Error::Database(db_err) => {
            ItemStoreError::Query(format!("database error in {operation}: {}", db_err.message()))
        }
        _ => ItemStoreError::Query(format!("sqlx error in {operation}: {err}")),
    }
}
