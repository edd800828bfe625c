//! Short human-readable justifications.

use brew_core::config::RecommendationConfig;
use brew_core::models::{Algorithm, AttributeFamily, CoffeeItem, PreferenceFeatures};

use crate::scoring::Scored;

/// Item attribute values the user likes, strongest first, at most `limit`.
pub fn matching_attributes(
    preferences: &PreferenceFeatures,
    item: &CoffeeItem,
    limit: usize,
) -> Vec<String> {
    let mut matches: Vec<(f64, String)> = AttributeFamily::ALL
        .into_iter()
        .flat_map(|family| {
            item.attributes(family)
                .into_iter()
                .map(move |value| (preferences.affinity(family, &value), value))
        })
        .filter(|(affinity, _)| *affinity > 0.0)
        .collect();
    matches.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    matches.into_iter().take(limit).map(|(_, value)| value).collect()
}

pub fn explain(
    item: &CoffeeItem,
    scored: &Scored,
    preferences: &PreferenceFeatures,
    config: &RecommendationConfig,
) -> String {
    match scored.algorithm {
        Algorithm::Popularity => popular(config),
        Algorithm::ContentBased => taste(preferences, item).unwrap_or_else(|| popular(config)),
        Algorithm::Collaborative => similar_users(scored.supporters(&item.id))
            .unwrap_or_else(|| "A fresh pick from the catalog".to_string()),
        Algorithm::Hybrid => similar_users(scored.supporters(&item.id))
            .or_else(|| taste(preferences, item))
            .unwrap_or_else(|| popular(config)),
        Algorithm::Discovery => match item.origin.country.as_deref() {
            Some(country) => format!("Something new to explore from {country}"),
            None => "Something new to explore".to_string(),
        },
        Algorithm::Social => match scored.supporters(&item.id) {
            1 => "Enjoyed by one of your connections".to_string(),
            n => format!("Enjoyed by {n} of your connections"),
        },
    }
}

fn popular(config: &RecommendationConfig) -> String {
    match config.popularity_window_days {
        7 => "Popular this week".to_string(),
        1 => "Popular today".to_string(),
        days => format!("Popular over the last {days} days"),
    }
}

fn taste(preferences: &PreferenceFeatures, item: &CoffeeItem) -> Option<String> {
    let matches = matching_attributes(preferences, item, 2);
    match matches.as_slice() {
        [] => None,
        [one] => Some(format!("Similar to coffees you rated highly: {one}")),
        [first, second, ..] => Some(format!("Similar to coffees you rated highly: {first}, {second}")),
    }
}

fn similar_users(supporters: usize) -> Option<String> {
    match supporters {
        0 => None,
        1 => Some("Liked by a coffee drinker with similar taste".to_string()),
        n => Some(format!("Liked by {n} coffee drinkers with similar taste")),
    }
}
