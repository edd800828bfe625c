use std::collections::BTreeSet;

use brew_core::errors::BrewResult;
use brew_core::models::{CatalogFilter, CoffeeItem};
use brew_core::traits::{ICatalog, IEventStore};

/// Catalog items the user has not interacted with and did not exclude,
/// newest first, at most `pool_size`.
pub fn gather(
    catalog: &dyn ICatalog,
    store: &dyn IEventStore,
    user_id: &str,
    excluded: &[String],
    pool_size: usize,
) -> BrewResult<Vec<CoffeeItem>> {
    let mut exclude: BTreeSet<String> = store.interacted_item_ids(user_id)?.into_iter().collect();
    exclude.extend(excluded.iter().cloned());

    let filter = CatalogFilter {
        exclude_ids: exclude.iter().cloned().collect(),
        limit: Some(pool_size),
        ..CatalogFilter::default()
    };
    let items = catalog.find_items(&filter)?;
    Ok(items
        .into_iter()
        .filter(|item| !exclude.contains(&item.id))
        .collect())
}
