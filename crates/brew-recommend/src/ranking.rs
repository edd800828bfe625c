//! Deterministic ordering and truncation.

use brew_core::config::RecommendationConfig;
use brew_core::models::CoffeeItem;

#[derive(Debug, Clone)]
pub struct ScoredItem<'a> {
    pub item: &'a CoffeeItem,
    pub score: f64,
}

/// Score descending, then catalog `createdAt` descending, then id ascending.
pub fn order(items: &mut [ScoredItem<'_>]) {
    items.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.item.created_at.cmp(&a.item.created_at))
            .then_with(|| a.item.id.cmp(&b.item.id))
    });
}

pub fn effective_limit(requested: Option<usize>, config: &RecommendationConfig) -> usize {
    requested.unwrap_or(config.default_limit).min(config.max_limit)
}
