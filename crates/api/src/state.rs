use std::sync::Arc;

use hearth_core::events::bus::EventBus;
use hearth_core::featured::service::FeaturedService;
use hearth_core::store::{ContentStore, PgContentStore};
use sqlx::PgPool;

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State`
/// extractor. Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    pool: PgPool,
    config: AppConfig,
    event_bus: EventBus,
    store: Arc<dyn ContentStore>,
    featured: FeaturedService,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig, event_bus: EventBus) -> Self {
        let store: Arc<dyn ContentStore> = Arc::new(PgContentStore::new(pool.clone()));
        let featured = FeaturedService::new(store.clone());
        Self {
            inner: Arc::new(InnerState {
                pool,
                config,
                event_bus,
                store,
                featured,
            }),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.inner.store.as_ref()
    }

    pub fn featured(&self) -> &FeaturedService {
        &self.inner.featured
    }
}
