use brew_core::models::SocialFeatures;
use brew_core::traits::ISocialGraph;

/// Neutral influence and susceptibility; connection count from the graph
/// when one is configured. A failing graph degrades to no connections.
pub fn extract(user_id: &str, graph: Option<&dyn ISocialGraph>) -> SocialFeatures {
    let connection_count = match graph.map(|g| g.connections(user_id)) {
        Some(Ok(connections)) => connections.len(),
        Some(Err(err)) => {
            tracing::warn!(event = "social_graph_unavailable", user_id, error = %err);
            0
        }
        None => 0,
    };
    SocialFeatures {
        connection_count,
        ..SocialFeatures::default()
    }
}
