use brew_core::models::{AttributeFamily, CoffeeItem, PreferenceFeatures};

use super::{ScoreMap, ScoringInput};

pub fn score(input: &ScoringInput<'_>) -> ScoreMap {
    let preferences = &input.snapshot.preference;
    input
        .candidates
        .iter()
        .map(|item| (item.id.clone(), affinity(preferences, item)))
        .collect()
}

/// Attribute-affinity dot product: per family the user has preferences in,
/// the summed preference share of the item's values (capped at 1), averaged
/// over those families.
pub fn affinity(preferences: &PreferenceFeatures, item: &CoffeeItem) -> f64 {
    let families: Vec<AttributeFamily> = AttributeFamily::ALL
        .into_iter()
        .filter(|family| !preferences.family(*family).is_empty())
        .collect();
    if families.is_empty() {
        return 0.0;
    }
    let total: f64 = families
        .iter()
        .map(|family| {
            item.attributes(*family)
                .iter()
                .map(|value| preferences.affinity(*family, value))
                .sum::<f64>()
                .min(1.0)
        })
        .sum();
    total / families.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use brew_core::models::{FlavorProfile, Origin, WeightedAttribute};
    use chrono::Utc;

    fn weighted(value: &str, score: f64) -> WeightedAttribute {
        WeightedAttribute {
            value: value.into(),
            score,
        }
    }

    fn item(roast: &str, country: &str, notes: &[&str]) -> CoffeeItem {
        CoffeeItem {
            id: format!("{roast}-{country}"),
            name: String::new(),
            roast_level: Some(roast.into()),
            origin: Origin {
                country: Some(country.into()),
                region: None,
            },
            processing_details: Default::default(),
            flavor_profile: FlavorProfile {
                flavor_notes: notes.iter().map(|n| n.to_string()).collect(),
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn matching_attributes_score_higher() {
        let preferences = PreferenceFeatures {
            preferred_roast_levels: vec![weighted("light", 1.0)],
            preferred_origins: vec![weighted("ethiopia", 0.7), weighted("kenya", 0.3)],
            preferred_flavor_notes: vec![weighted("jasmine", 0.5), weighted("lemon", 0.5)],
            ..Default::default()
        };
        let close = affinity(&preferences, &item("Light", "Ethiopia", &["jasmine", "lemon"]));
        let partial = affinity(&preferences, &item("light", "Kenya", &["tomato"]));
        let unrelated = affinity(&preferences, &item("dark", "Brazil", &["smoke"]));
        assert!((close - 0.9).abs() < 1e-12);
        assert!(close > partial && partial > unrelated);
        assert_eq!(unrelated, 0.0);
    }

    #[test]
    fn no_preferences_scores_zero() {
        let preferences = PreferenceFeatures::default();
        assert_eq!(affinity(&preferences, &item("light", "Kenya", &[])), 0.0);
    }
}
