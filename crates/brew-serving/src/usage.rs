//! Requests served per `(model name, version)`.

use dashmap::DashMap;

use brew_core::models::RequestCount;

#[derive(Default)]
pub struct RequestCounter {
    counts: DashMap<(String, String), u64>,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str, version: &str) {
        *self
            .counts
            .entry((name.to_string(), version.to_string()))
            .or_insert(0) += 1;
    }

    pub fn get(&self, name: &str, version: &str) -> u64 {
        self.counts
            .get(&(name.to_string(), version.to_string()))
            .map(|c| *c)
            .unwrap_or(0)
    }

    /// Sorted by name, then version.
    pub fn snapshot(&self) -> Vec<RequestCount> {
        let mut counts: Vec<RequestCount> = self
            .counts
            .iter()
            .map(|entry| RequestCount {
                name: entry.key().0.clone(),
                version: entry.key().1.clone(),
                requests: *entry.value(),
            })
            .collect();
        counts.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));
        counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|entry| *entry.value()).sum()
    }
}
