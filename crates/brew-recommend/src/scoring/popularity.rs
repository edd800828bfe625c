use std::collections::HashMap;

use brew_core::config::span_secs;
use brew_core::errors::BrewResult;
use brew_core::models::CoffeeItem;

use super::{ScoreMap, ScoringInput};

/// `ln(1 + count) / ln(1 + max)` over interactions in the popularity window.
pub fn score(input: &ScoringInput<'_>) -> BrewResult<ScoreMap> {
    let window = span_secs(input.config.popularity_window_days.saturating_mul(86_400));
    let since = input.now - window;
    let counts = input.store.item_popularity(since)?;
    Ok(log_scaled(input.candidates, &counts))
}

pub fn log_scaled(candidates: &[CoffeeItem], counts: &HashMap<String, u64>) -> ScoreMap {
    let max = candidates
        .iter()
        .filter_map(|item| counts.get(&item.id))
        .copied()
        .max()
        .unwrap_or(0);
    let denominator = (max as f64).ln_1p();
    candidates
        .iter()
        .map(|item| {
            let count = counts.get(&item.id).copied().unwrap_or(0) as f64;
            let score = if denominator > 0.0 {
                count.ln_1p() / denominator
            } else {
                0.0
            };
            (item.id.clone(), score)
        })
        .collect()
}
