//! Undirected in-memory social graph.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use brew_core::errors::BrewResult;
use brew_core::traits::ISocialGraph;

use crate::lock_poisoned;

#[derive(Default)]
pub struct InMemorySocialGraph {
    edges: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl InMemorySocialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect two users both ways. Self-edges are ignored.
    pub fn connect(&self, a: &str, b: &str) -> BrewResult<()> {
        if a == b {
            return Ok(());
        }
        let mut edges = self.edges.write().map_err(|_| lock_poisoned("social graph"))?;
        edges.entry(a.to_string()).or_default().insert(b.to_string());
        edges.entry(b.to_string()).or_default().insert(a.to_string());
        Ok(())
    }
}

impl ISocialGraph for InMemorySocialGraph {
    /// Sorted by user id.
    fn connections(&self, user_id: &str) -> BrewResult<Vec<String>> {
        let edges = self.edges.read().map_err(|_| lock_poisoned("social graph"))?;
        Ok(edges
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }
}
