use chrono::Utc;
use proptest::prelude::*;

use brew_core::models::{AbVariant, Algorithm};
use brew_serving::AbTestManager;

fn normalized(weights: Vec<u32>) -> Vec<AbVariant> {
    let total: u32 = weights.iter().sum();
    weights
        .iter()
        .enumerate()
        .map(|(i, w)| AbVariant {
            model_version: format!("v{i}"),
            algorithm: Algorithm::Hybrid,
            traffic_share: f64::from(*w) / f64::from(total),
        })
        .collect()
}

proptest! {
    #[test]
    fn assignment_stable_and_never_hits_zero_share(
        weights in prop::collection::vec(0u32..10, 1..5),
        users in prop::collection::vec("[a-z]{1,12}", 1..20),
    ) {
        prop_assume!(weights.iter().any(|w| *w > 0));
        let manager = AbTestManager::new();
        let variants = normalized(weights.clone());
        manager.create("prop", "m", variants, Utc::now()).unwrap();

        for user in &users {
            let a = manager.assign("prop", user).unwrap();
            let b = manager.assign("prop", user).unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert!(a.variant_index < weights.len());
            prop_assert!(weights[a.variant_index] > 0);
        }
    }
}
