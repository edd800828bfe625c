use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use brew_core::errors::BrewResult;
use brew_core::models::Algorithm;

use super::{implicit_rating, normalize_by_max, popularity, ScoringInput, Scored, PEER_EVENT_LIMIT};

/// Items engaged by the user's connections, scored by the connections'
/// summed strongest implicit rating. Only those items are eligible. Falls
/// back to popularity without a graph, without connections, or when the
/// connections engaged with none of the candidates.
pub fn score(input: &ScoringInput<'_>) -> BrewResult<Scored> {
    let connections = match input.social {
        Some(graph) => graph.connections(input.user_id).unwrap_or_else(|err| {
            warn!(event = "social_graph_unavailable", user_id = input.user_id, error = %err);
            Vec::new()
        }),
        None => Vec::new(),
    };
    if connections.is_empty() {
        return fallback(input, "no connections");
    }

    let candidate_ids: HashSet<&str> = input.candidates.iter().map(|c| c.id.as_str()).collect();
    let mut strongest: HashMap<(String, String), f64> = HashMap::new();
    for event in input.store.events_by_users(&connections, PEER_EVENT_LIMIT)? {
        if !candidate_ids.contains(event.item_id.as_str()) {
            continue;
        }
        let rating = implicit_rating(&event, input.weights);
        let slot = strongest.entry((event.user_id, event.item_id)).or_insert(0.0);
        *slot = slot.max(rating);
    }
    if strongest.is_empty() {
        return fallback(input, "connections engaged with no candidate");
    }

    let mut scores = HashMap::new();
    let mut supporters = HashMap::new();
    for ((_, item), rating) in strongest {
        *scores.entry(item.clone()).or_insert(0.0) += rating;
        *supporters.entry(item).or_insert(0) += 1;
    }
    Ok(Scored {
        scores: normalize_by_max(scores),
        algorithm: Algorithm::Social,
        supporters,
        scored_only: true,
    })
}

fn fallback(input: &ScoringInput<'_>, reason: &str) -> BrewResult<Scored> {
    debug!(event = "social_fallback", user_id = input.user_id, reason);
    Ok(Scored::plain(popularity::score(input)?, Algorithm::Popularity))
}
