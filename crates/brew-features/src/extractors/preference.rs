//! Decayed, weighted attribute preferences.

use std::collections::HashMap;

use brew_core::models::{AttributeFamily, PreferenceFeatures, WeightedAttribute};

use super::ExtractionInput;

/// Each event contributes `weight(type) × e^(−decay × rank)` (rank 0 = newest)
/// to every attribute value of its item. Values are then normalized to shares
/// of their family total and cut to the top N.
pub fn extract(input: &ExtractionInput<'_>) -> PreferenceFeatures {
    let weights = &input.config.interaction_weights;
    let decay = input.config.recency_decay_rate;

    let mut totals: HashMap<AttributeFamily, HashMap<String, f64>> = HashMap::new();
    for (rank, event) in input.events.iter().enumerate() {
        let Some(item) = input.items.get(&event.item_id) else {
            continue;
        };
        let contribution = weights.weight(event.interaction_type) * (-decay * rank as f64).exp();
        if contribution <= 0.0 {
            continue;
        }
        for family in AttributeFamily::ALL {
            let family_totals = totals.entry(family).or_default();
            for value in item.attributes(family) {
                *family_totals.entry(value).or_insert(0.0) += contribution;
            }
        }
    }

    let mut preferences = PreferenceFeatures::default();
    for family in AttributeFamily::ALL {
        if let Some(values) = totals.get(&family) {
            *preferences.family_mut(family) = rank_family(values, input.config.preference_top_n);
        }
    }
    preferences
}

fn rank_family(values: &HashMap<String, f64>, top_n: usize) -> Vec<WeightedAttribute> {
    let sum: f64 = values.values().sum();
    if sum <= 0.0 {
        return Vec::new();
    }
    let mut ranked: Vec<WeightedAttribute> = values
        .iter()
        .map(|(value, score)| WeightedAttribute {
            value: value.clone(),
            score: score / sum,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.value.cmp(&b.value))
    });
    ranked.truncate(top_n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::tests_support::{event_at, input_for};
    use brew_core::models::InteractionType;

    #[test]
    fn stronger_and_newer_interactions_dominate() {
        // Newest first: purchase of the light coffee, then a view of the dark one.
        let events = vec![
            event_at("light", InteractionType::Purchase, 10),
            event_at("dark", InteractionType::View, 0),
        ];
        let prefs = extract(&input_for(&events));
        let roasts = &prefs.preferred_roast_levels;
        assert_eq!(roasts[0].value, "light");
        assert_eq!(roasts[1].value, "dark");
        let sum: f64 = roasts.iter().map(|r| r.score).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(prefs.affinity(AttributeFamily::Origin, "ethiopia") > 0.8);
    }

    #[test]
    fn ties_break_by_value_and_top_n_applies() {
        let mut values = HashMap::new();
        for v in ["b", "a", "c"] {
            values.insert(v.to_string(), 1.0);
        }
        let ranked = rank_family(&values, 2);
        let names: Vec<_> = ranked.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn unknown_items_are_ignored() {
        let events = vec![event_at("ghost", InteractionType::Purchase, 0)];
        assert!(extract(&input_for(&events)).is_empty());
    }
}
