//! In-memory catalog, loadable from a JSON array of coffee records.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

use brew_core::errors::{BrewError, BrewResult, CatalogError};
use brew_core::models::{CatalogFilter, CoffeeItem};
use brew_core::traits::ICatalog;

use crate::lock_poisoned;

#[derive(Default)]
pub struct InMemoryCatalog {
    items: RwLock<BTreeMap<String, CoffeeItem>>,
}

impl InMemoryCatalog {
    pub fn new(items: impl IntoIterator<Item = CoffeeItem>) -> Self {
        Self {
            items: RwLock::new(items.into_iter().map(|i| (i.id.clone(), i)).collect()),
        }
    }

    /// Parse a JSON array of camelCase coffee records.
    pub fn from_json(json: &str) -> BrewResult<Self> {
        let items: Vec<CoffeeItem> = serde_json::from_str(json).map_err(|e| {
            BrewError::Catalog(CatalogError::LoadFailed {
                source_name: "<string>".to_string(),
                reason: e.to_string(),
            })
        })?;
        Ok(Self::new(items))
    }

    pub fn from_json_file(path: &Path) -> BrewResult<Self> {
        let load_failed = |reason: String| {
            BrewError::Catalog(CatalogError::LoadFailed {
                source_name: path.display().to_string(),
                reason,
            })
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_failed(e.to_string()))?;
        let items: Vec<CoffeeItem> =
            serde_json::from_str(&content).map_err(|e| load_failed(e.to_string()))?;
        tracing::info!(path = %path.display(), items = items.len(), "catalog loaded");
        Ok(Self::new(items))
    }

    /// Insert or replace an item.
    pub fn upsert(&self, item: CoffeeItem) -> BrewResult<()> {
        self.items
            .write()
            .map_err(|_| lock_poisoned("catalog"))?
            .insert(item.id.clone(), item);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ICatalog for InMemoryCatalog {
    fn get_item(&self, id: &str) -> BrewResult<Option<CoffeeItem>> {
        let items = self.items.read().map_err(|_| lock_poisoned("catalog"))?;
        Ok(items.get(id).cloned())
    }

    fn get_items(&self, ids: &[String]) -> BrewResult<Vec<CoffeeItem>> {
        let items = self.items.read().map_err(|_| lock_poisoned("catalog"))?;
        Ok(ids.iter().filter_map(|id| items.get(id).cloned()).collect())
    }

    fn find_items(&self, filter: &CatalogFilter) -> BrewResult<Vec<CoffeeItem>> {
        let items = self.items.read().map_err(|_| lock_poisoned("catalog"))?;
        let mut found: Vec<CoffeeItem> = items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        if let Some(limit) = filter.limit {
            found.truncate(limit);
        }
        Ok(found)
    }
}
