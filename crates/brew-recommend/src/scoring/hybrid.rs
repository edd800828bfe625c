use brew_core::errors::BrewResult;
use brew_core::models::Algorithm;

use super::{collaborative, content, popularity, ScoringInput, Scored};

/// Weighted blend of collaborative, content and popularity scores. Without
/// any collaborative signal its weight is dropped and the rest renormalized.
pub fn score(input: &ScoringInput<'_>) -> BrewResult<Scored> {
    let weights = &input.config.hybrid_weights;
    let collaborative = collaborative::score(input)?;
    let content = content::score(input);
    let popularity = popularity::score(input)?;

    let has_neighbors = collaborative.scores.values().any(|s| *s > 0.0);
    let w_collaborative = if has_neighbors {
        weights.collaborative.max(0.0)
    } else {
        0.0
    };
    let w_content = weights.content.max(0.0);
    let w_popularity = weights.popularity.max(0.0);
    let total = w_collaborative + w_content + w_popularity;

    let scores = input
        .candidates
        .iter()
        .map(|item| {
            let blended = w_collaborative * collaborative.get(&item.id)
                + w_content * content.get(&item.id).copied().unwrap_or(0.0)
                + w_popularity * popularity.get(&item.id).copied().unwrap_or(0.0);
            let score = if total > 0.0 { blended / total } else { 0.0 };
            (item.id.clone(), score)
        })
        .collect();

    Ok(Scored {
        scores,
        algorithm: Algorithm::Hybrid,
        supporters: collaborative.supporters,
        scored_only: false,
    })
}
