use brew_core::errors::BrewResult;
use brew_core::models::{AttributeFamily, CoffeeItem, PreferenceFeatures};

use super::{content, popularity, ScoreMap, ScoringInput};

/// Content affinity blended with novelty, where novelty is half
/// unpopularity and half unfamiliar attributes.
pub fn score(input: &ScoringInput<'_>) -> BrewResult<ScoreMap> {
    let popularity = popularity::score(input)?;
    let preferences = &input.snapshot.preference;
    let novelty_weight = input.config.discovery_novelty_weight.clamp(0.0, 1.0);

    Ok(input
        .candidates
        .iter()
        .map(|item| {
            let popular = popularity.get(&item.id).copied().unwrap_or(0.0);
            let novelty = 0.5 * (1.0 - popular) + 0.5 * unfamiliarity(preferences, item);
            let score = (1.0 - novelty_weight) * content::affinity(preferences, item)
                + novelty_weight * novelty;
            (item.id.clone(), score)
        })
        .collect())
}

/// Share of the item's attribute families in which none of its values
/// carries any of the user's preference.
pub fn unfamiliarity(preferences: &PreferenceFeatures, item: &CoffeeItem) -> f64 {
    let families: Vec<(AttributeFamily, Vec<String>)> = AttributeFamily::ALL
        .into_iter()
        .map(|family| (family, item.attributes(family)))
        .filter(|(_, values)| !values.is_empty())
        .collect();
    if families.is_empty() {
        return 0.0;
    }
    let unfamiliar = families
        .iter()
        .filter(|(family, values)| values.iter().all(|v| preferences.affinity(*family, v) == 0.0))
        .count();
    unfamiliar as f64 / families.len() as f64
}
