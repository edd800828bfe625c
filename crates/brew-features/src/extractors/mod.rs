//! Pure section extractors. Every extractor receives the user's window of
//! events newest first and never fails.

pub mod behavioral;
pub mod diversity;
pub mod engagement;
pub mod preference;
pub mod social;
pub mod temporal;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use brew_core::config::FeatureConfig;
use brew_core::models::{CoffeeItem, InteractionEvent};

/// Inputs shared by all extractors.
pub struct ExtractionInput<'a> {
    /// Newest first.
    pub events: &'a [InteractionEvent],
    pub items: &'a HashMap<String, CoffeeItem>,
    pub config: &'a FeatureConfig,
    pub now: DateTime<Utc>,
}

/// Divide every count by `total`. Empty when `total` is 0.
pub(crate) fn fractions<K: Ord + Clone>(
    counts: &BTreeMap<K, usize>,
    total: usize,
) -> BTreeMap<K, f64> {
    if total == 0 {
        return BTreeMap::new();
    }
    counts
        .iter()
        .map(|(k, c)| (k.clone(), *c as f64 / total as f64))
        .collect()
}

/// Key with the largest share. Ties go to the smallest key.
pub(crate) fn mode<K: Ord + Clone>(distribution: &BTreeMap<K, f64>) -> Option<K> {
    let mut best: Option<(&K, f64)> = None;
    for (k, v) in distribution {
        if best.map_or(true, |(_, b)| *v > b) {
            best = Some((k, *v));
        }
    }
    best.map(|(k, _)| k.clone())
}

pub(crate) fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds().max(0) as f64 / 86_400_000.0
}
