//! User-based neighborhood scoring over implicit feedback.

use std::collections::{BTreeSet, HashMap, HashSet};

use brew_core::errors::BrewResult;
use brew_core::models::Algorithm;

use super::{implicit_rating, ScoringInput, Scored, PEER_EVENT_LIMIT};

/// Neighbors are users who engaged positively with items the user liked;
/// similarity is the share of the user's liked items they also liked. An
/// item scores the similarity-weighted mean of its neighbors' strongest
/// implicit rating, over all neighbors.
pub fn score(input: &ScoringInput<'_>) -> BrewResult<Scored> {
    let empty = Scored::plain(Default::default(), Algorithm::Collaborative);

    let history = input.store.recent_events(input.user_id, PEER_EVENT_LIMIT)?;
    let liked: BTreeSet<String> = history
        .iter()
        .filter(|e| e.is_positive())
        .map(|e| e.item_id.clone())
        .collect();
    if liked.is_empty() {
        return Ok(empty);
    }

    let liked_ids: Vec<String> = liked.iter().cloned().collect();
    let mut overlap: HashMap<String, HashSet<String>> = HashMap::new();
    for event in input.store.events_for_items(&liked_ids, PEER_EVENT_LIMIT)? {
        if event.user_id != input.user_id && event.is_positive() {
            overlap.entry(event.user_id).or_default().insert(event.item_id);
        }
    }
    let mut neighbors: Vec<(String, f64)> = overlap
        .into_iter()
        .map(|(user, items)| (user, items.len() as f64 / liked.len() as f64))
        .collect();
    neighbors.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    neighbors.truncate(input.config.neighbor_count);
    if neighbors.is_empty() {
        return Ok(empty);
    }

    let similarity: HashMap<String, f64> = neighbors.iter().cloned().collect();
    let total_similarity: f64 = similarity.values().sum();
    let neighbor_ids: Vec<String> = neighbors.into_iter().map(|(user, _)| user).collect();
    let candidate_ids: HashSet<&str> = input.candidates.iter().map(|c| c.id.as_str()).collect();

    let mut strongest: HashMap<(String, String), f64> = HashMap::new();
    for event in input.store.events_by_users(&neighbor_ids, PEER_EVENT_LIMIT)? {
        if !candidate_ids.contains(event.item_id.as_str()) {
            continue;
        }
        let rating = implicit_rating(&event, input.weights);
        let slot = strongest.entry((event.user_id, event.item_id)).or_insert(0.0);
        *slot = slot.max(rating);
    }

    let mut scored = empty;
    for ((user, item), rating) in strongest {
        let weight = similarity.get(&user).copied().unwrap_or(0.0);
        *scored.scores.entry(item.clone()).or_insert(0.0) += weight * rating / total_similarity;
        *scored.supporters.entry(item).or_insert(0) += 1;
    }
    Ok(scored)
}
