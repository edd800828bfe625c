use brew_core::constants::MAX_RATING;
use brew_core::models::{EngagementFeatures, InteractionType};

use super::ExtractionInput;

/// Blend of positive-signal share, purchase rate and normalized mean rating.
const POSITIVE_SHARE_WEIGHT: f64 = 0.5;
const PURCHASE_WEIGHT: f64 = 0.25;
const RATING_WEIGHT: f64 = 0.25;

pub fn extract(input: &ExtractionInput<'_>) -> EngagementFeatures {
    let events = input.events;
    if events.is_empty() {
        return EngagementFeatures::default();
    }

    let ratings: Vec<f64> = events
        .iter()
        .filter(|e| e.interaction_type == InteractionType::Rating)
        .filter_map(|e| e.value)
        .collect();
    let (average_rating, rating_variance) = mean_and_variance(&ratings);

    let count = |t: InteractionType| events.iter().filter(|e| e.interaction_type == t).count();
    let views = count(InteractionType::View);
    let denominator = if views > 0 { views } else { events.len() } as f64;
    let purchase_rate = (count(InteractionType::Purchase) as f64 / denominator).clamp(0.0, 1.0);
    let favorite_rate = (count(InteractionType::Favorite) as f64 / denominator).clamp(0.0, 1.0);

    let positive_share =
        events.iter().filter(|e| e.is_positive()).count() as f64 / events.len() as f64;
    let engagement_score = (POSITIVE_SHARE_WEIGHT * positive_share
        + PURCHASE_WEIGHT * purchase_rate
        + RATING_WEIGHT * (average_rating / MAX_RATING))
        .clamp(0.0, 1.0);

    EngagementFeatures {
        average_rating,
        rating_variance,
        rating_count: ratings.len(),
        purchase_rate,
        favorite_rate,
        engagement_score,
    }
}

/// Mean and population variance; `(0, 0)` for no values.
pub fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::tests_support::{event_at, input_for, rating_at};

    #[test]
    fn rating_statistics() {
        let events = vec![rating_at("c1", 5.0, 2), rating_at("c2", 3.0, 1), rating_at("c3", 4.0, 0)];
        let features = extract(&input_for(&events));
        assert_eq!(features.rating_count, 3);
        assert!((features.average_rating - 4.0).abs() < 1e-9);
        assert!((features.rating_variance - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn rates_relative_to_views() {
        let events = vec![
            event_at("c1", InteractionType::Purchase, 3),
            event_at("c1", InteractionType::View, 2),
            event_at("c2", InteractionType::View, 1),
            event_at("c2", InteractionType::Favorite, 0),
        ];
        let features = extract(&input_for(&events));
        assert!((features.purchase_rate - 0.5).abs() < 1e-9);
        assert!((features.favorite_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rates_fall_back_to_all_interactions_and_clamp() {
        let events = vec![
            event_at("c1", InteractionType::Purchase, 1),
            event_at("c2", InteractionType::Purchase, 0),
        ];
        let features = extract(&input_for(&events));
        assert!((features.purchase_rate - 1.0).abs() < 1e-9);
        assert!(features.engagement_score <= 1.0);
    }
}
