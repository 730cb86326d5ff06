use std::sync::Arc;

use itemflow_core::{Clock, SystemClock};
use itemflow_infra::{ItemService, ItemStore, StoreConfig};

/// Item service as wired for the HTTP layer: type-erased store and clock so the
/// same router serves the in-memory and Postgres backends.
pub type DynItemService = ItemService<Arc<dyn ItemStore>, Arc<dyn Clock>>;

/// Everything handlers need, shared behind an `Arc` extension.
pub struct AppServices {
    items: DynItemService,
}

impl AppServices {
    pub fn new(store: Arc<dyn ItemStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            items: ItemService::new(store, clock),
        }
    }

    pub fn items(&self) -> &DynItemService {
        &self.items
    }
}

pub async fn build_services(config: &StoreConfig) -> anyhow::Result<AppServices> {
    let store = config.build_store().await?;
    Ok(AppServices::new(store, Arc::new(SystemClock)))
}
