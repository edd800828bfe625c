//! Health probes for the service's dependencies.

use std::sync::Arc;

use brew_core::errors::BrewResult;
use brew_core::models::CatalogFilter;
use brew_core::traits::{ICatalog, IEventStore, IHealthProbe};

pub struct StorageProbe {
    store: Arc<dyn IEventStore>,
}

impl StorageProbe {
    pub fn new(store: Arc<dyn IEventStore>) -> Self {
        Self { store }
    }
}

impl IHealthProbe for StorageProbe {
    fn name(&self) -> &str {
        "storage"
    }

    fn probe(&self) -> BrewResult<()> {
        self.store.ping()
    }
}

/// A single-item catalog query.
pub struct CatalogProbe {
    catalog: Arc<dyn ICatalog>,
}

impl CatalogProbe {
    pub fn new(catalog: Arc<dyn ICatalog>) -> Self {
        Self { catalog }
    }
}

impl IHealthProbe for CatalogProbe {
    fn name(&self) -> &str {
        "catalog"
    }

    fn probe(&self) -> BrewResult<()> {
        let filter = CatalogFilter {
            limit: Some(1),
            ..Default::default()
        };
        self.catalog.find_items(&filter).map(|_| ())
    }
}
