use std::collections::HashSet;

use brew_core::constants::EXPLORATION_WINDOW;
use brew_core::models::DiversityFeatures;

use super::ExtractionInput;

pub fn extract(input: &ExtractionInput<'_>) -> DiversityFeatures {
    let events = input.events;
    if events.is_empty() {
        return DiversityFeatures::default();
    }

    let unique: HashSet<&str> = events.iter().map(|e| e.item_id.as_str()).collect();

    // Walk oldest → newest, marking first touches of each item.
    let mut seen: HashSet<&str> = HashSet::new();
    let first_touch: Vec<bool> = events
        .iter()
        .rev()
        .map(|e| seen.insert(e.item_id.as_str()))
        .collect();
    let recent = events.len().min(EXPLORATION_WINDOW);
    let explored = first_touch.iter().rev().take(recent).filter(|f| **f).count();

    DiversityFeatures {
        unique_item_ratio: unique.len() as f64 / events.len() as f64,
        exploration_rate: explored as f64 / recent as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::tests_support::{event_at, input_for};
    use brew_core::models::InteractionType;

    #[test]
    fn ratios_over_window() {
        // Newest first: c1 again, c2, c1.
        let events = vec![
            event_at("c1", InteractionType::View, 2),
            event_at("c2", InteractionType::View, 1),
            event_at("c1", InteractionType::View, 0),
        ];
        let features = extract(&input_for(&events));
        assert!((features.unique_item_ratio - 2.0 / 3.0).abs() < 1e-9);
        assert!((features.exploration_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn exploration_only_counts_most_recent_window() {
        // 150 distinct-then-repeated events: the newest 100 are all repeats.
        let mut events: Vec<_> = (0..50)
            .map(|i| event_at(&format!("c{i}"), InteractionType::View, i))
            .collect();
        events.extend((50..150).map(|i| event_at("c0", InteractionType::View, i)));
        events.reverse();
        let features = extract(&input_for(&events));
        assert_eq!(features.exploration_rate, 0.0);
    }
}
