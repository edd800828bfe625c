use crate::errors::BrewResult;
use crate::models::{CatalogFilter, CoffeeItem};

/// Read-only view of the coffee catalog collaborator.
pub trait ICatalog: Send + Sync {
    fn get_item(&self, id: &str) -> BrewResult<Option<CoffeeItem>>;
    /// Unknown ids are skipped.
    fn get_items(&self, ids: &[String]) -> BrewResult<Vec<CoffeeItem>>;
    /// Newest first, then by id.
    fn find_items(&self, filter: &CatalogFilter) -> BrewResult<Vec<CoffeeItem>>;
}
