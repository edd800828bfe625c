//! Deterministic variant assignment.

use brew_core::models::AbVariant;

/// Map `testId:userId` to a stable point in `[0, 1)`.
pub fn bucket(test_id: &str, user_id: &str) -> f64 {
    let hash = blake3::hash(format!("{test_id}:{user_id}").as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    // 53 high bits give an exactly representable fraction below 1.0.
    (u64::from_le_bytes(prefix) >> 11) as f64 / (1u64 << 53) as f64
}

/// Index of the variant whose cumulative share interval contains `point`.
/// Falls back to the last variant with a positive share when rounding
/// leaves a gap below 1.0.
pub fn pick_variant(variants: &[AbVariant], point: f64) -> usize {
    let mut cumulative = 0.0;
    for (index, variant) in variants.iter().enumerate() {
        cumulative += variant.traffic_share;
        if point < cumulative {
            return index;
        }
    }
    variants
        .iter()
        .rposition(|v| v.traffic_share > 0.0)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brew_core::models::Algorithm;

    fn variants(shares: &[f64]) -> Vec<AbVariant> {
        shares
            .iter()
            .enumerate()
            .map(|(i, s)| AbVariant {
                model_version: format!("v{i}"),
                algorithm: Algorithm::Hybrid,
                traffic_share: *s,
            })
            .collect()
    }

    #[test]
    fn bucket_is_stable_and_in_range() {
        let a = bucket("t1", "alice");
        assert_eq!(a, bucket("t1", "alice"));
        assert!((0.0..1.0).contains(&a));
        assert_ne!(a, bucket("t2", "alice"));
    }

    #[test]
    fn picks_by_cumulative_share() {
        let v = variants(&[0.2, 0.3, 0.5]);
        assert_eq!(pick_variant(&v, 0.0), 0);
        assert_eq!(pick_variant(&v, 0.19), 0);
        assert_eq!(pick_variant(&v, 0.2), 1);
        assert_eq!(pick_variant(&v, 0.49), 1);
        assert_eq!(pick_variant(&v, 0.99), 2);
    }

    #[test]
    fn rounding_gap_falls_back_to_last_live_variant() {
        let v = variants(&[0.5, 0.4999, 0.0]);
        assert_eq!(pick_variant(&v, 0.99995), 1);
    }

    #[test]
    fn zero_share_variant_is_never_picked() {
        let v = variants(&[0.0, 1.0]);
        for user in ["a", "b", "c", "d", "e"] {
            assert_eq!(pick_variant(&v, bucket("t", user)), 1);
        }
    }
}
