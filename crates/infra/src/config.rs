//! Store configuration loading.
//!
//! Read from the environment once at startup:
//!
//! - `USE_PERSISTENT_STORES`: `true` selects Postgres (default `false`)
//! - `DATABASE_URL`: required when persistent
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default 5)

use std::sync::Arc;

use anyhow::{Context, bail};

use crate::item_store::{InMemoryItemStore, ItemStore, PostgresItemStore};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::InMemory,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with the variable source injected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let persistent = match lookup("USE_PERSISTENT_STORES") {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .with_context(|| format!("USE_PERSISTENT_STORES must be true or false, got '{raw}'"))?,
            None => false,
        };

        if !persistent {
            return Ok(Self::in_memory());
        }

        let database_url = match lookup("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => url,
            _ => bail!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true"),
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS must be a positive integer, got '{raw}'"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be greater than zero");
        }

        Ok(Self {
            backend: StoreBackend::Postgres {
                database_url,
                max_connections,
            },
        })
    }

    /// Build the configured store. Postgres connects and bootstraps its schema.
    pub async fn build_store(&self) -> anyhow::Result<Arc<dyn ItemStore>> {
        match &self.backend {
            StoreBackend::InMemory => {
                tracing::info!("using in-memory item store");
                Ok(Arc::new(InMemoryItemStore::new()))
            }
            StoreBackend::Postgres {
                database_url,
                max_connections,
            } => {
                let store = PostgresItemStore::connect(database_url, *max_connections)
                    .await
                    .context("failed to connect Postgres item store")?;
                tracing::info!(max_connections, "using Postgres item store");
                Ok(Arc::new(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_in_memory() {
        let cfg = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, StoreConfig::in_memory());
    }

    #[test]
    fn persistent_requires_database_url() {
        let err = StoreConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "true")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn persistent_with_url_and_pool_size() {
        let cfg = StoreConfig::from_lookup(lookup(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/items"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ]))
        .unwrap();

        assert_eq!(
            cfg.backend,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/items".to_string(),
                max_connections: 12,
            }
        );
    }

    #[test]
    fn rejects_garbage_flags() {
        assert!(StoreConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "yes")])).is_err());
        assert!(
            StoreConfig::from_lookup(lookup(&[
                ("USE_PERSISTENT_STORES", "true"),
                ("DATABASE_URL", "postgres://localhost/items"),
                ("DATABASE_MAX_CONNECTIONS", "0"),
            ]))
            .is_err()
        );
    }

    #[tokio::test]
    async fn in_memory_backend_builds_a_working_store() {
        let store = StoreConfig::in_memory().build_store().await.unwrap();
        assert_eq!(store.clear().await.unwrap(), 0);
    }
}
