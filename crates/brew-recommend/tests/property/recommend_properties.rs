use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use brew_core::config::{FeatureConfig, RecommendationConfig};
use brew_core::models::{Algorithm, RecommendationRequest};
use brew_features::{FeatureCache, FeatureEngine};
use brew_recommend::RecommendationEngine;
use brew_serving::ServingRegistry;
use brew_storage::{InMemoryCatalog, MemoryStore};

const IDS: [&str; 12] = [
    "eth-yirgacheffe",
    "eth-guji",
    "ken-nyeri",
    "col-huila",
    "col-narino",
    "gua-antigua",
    "cr-tarrazu",
    "bra-cerrado",
    "bra-mogiana",
    "sum-mandheling",
    "ita-espresso",
    "pan-geisha",
];

fn engine() -> RecommendationEngine {
    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(
        InMemoryCatalog::from_json(&test_fixtures::load_fixture_text(test_fixtures::CATALOG))
            .unwrap(),
    );
    let features = Arc::new(FeatureEngine::new(
        store.clone(),
        catalog.clone(),
        Arc::new(FeatureCache::new(60, 100)),
        FeatureConfig::default(),
    ));
    RecommendationEngine::new(
        features,
        catalog,
        store,
        Arc::new(ServingRegistry::new()),
        RecommendationConfig::default(),
    )
}

proptest! {
    #[test]
    fn excluded_items_never_returned_and_limit_holds(
        excluded in prop::collection::btree_set(0usize..12, 0..12),
        limit in 0usize..20,
        algorithm in prop::sample::select(Algorithm::ALL.to_vec()),
    ) {
        let exclude: Vec<String> = excluded.iter().map(|i| IDS[*i].to_string()).collect();
        let request = RecommendationRequest {
            limit: Some(limit),
            algorithm: Some(algorithm),
            exclude_item_ids: exclude.clone(),
            ..Default::default()
        };
        let response = engine().generate_recommendations("someone", &request).unwrap();

        let expected = limit.min(IDS.len() - exclude.len());
        prop_assert_eq!(response.items.len(), expected);
        let returned: HashSet<&str> = response.items.iter().map(|i| i.item_id.as_str()).collect();
        prop_assert_eq!(returned.len(), response.items.len());
        for id in &exclude {
            prop_assert!(!returned.contains(id.as_str()));
        }
        for (index, item) in response.items.iter().enumerate() {
            prop_assert_eq!(item.rank, index + 1);
        }
        for pair in response.items.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}
