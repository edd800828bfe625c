//! Drift scoring against a frozen baseline.
//!
//! Three signals: performance (flagged relative metric changes), data
//! (population stability index over the response-time and rating
//! histograms) and concept (behavioral metric changes). The overall score is
//! their maximum.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use brew_core::config::DriftThresholds;
use brew_core::models::{
    DriftRecommendation, DriftResult, DriftSignals, DriftType, Histogram, MetricAggregate,
    MetricKind, ModelKey, METHOD_STATISTICAL,
};

/// Floor applied to bin fractions before taking logs.
pub const PSI_EPSILON: f64 = 1e-4;

/// `|current - baseline| / baseline`. With a zero baseline: 0 if the
/// current value is also 0, else 1.
pub fn relative_change(baseline: f64, current: f64) -> f64 {
    if baseline == 0.0 {
        if current == 0.0 {
            0.0
        } else {
            1.0
        }
    } else {
        ((current - baseline) / baseline).abs()
    }
}

/// Population stability index Σ (a − e)·ln(a / e). 0 when either side is empty.
pub fn psi(expected: &Histogram, actual: &Histogram) -> f64 {
    if expected.total() == 0 || actual.total() == 0 || expected.counts.len() != actual.counts.len() {
        return 0.0;
    }
    expected
        .fractions()
        .iter()
        .zip(actual.fractions())
        .map(|(e, a)| {
            let (e, a) = (e.max(PSI_EPSILON), a.max(PSI_EPSILON));
            (a - e) * (a / e).ln()
        })
        .sum()
}

fn performance_threshold(kind: MetricKind, thresholds: &DriftThresholds) -> Option<f64> {
    match kind {
        MetricKind::ClickThroughRate => Some(thresholds.click_through_rate),
        MetricKind::ConversionRate => Some(thresholds.conversion_rate),
        MetricKind::MeanRating => Some(thresholds.mean_rating),
        MetricKind::ResponseTimeMs => Some(thresholds.response_time),
        MetricKind::ErrorRate => Some(thresholds.error_rate),
        MetricKind::EngagementRate => None,
    }
}

const CONCEPT_METRICS: [MetricKind; 3] = [
    MetricKind::ClickThroughRate,
    MetricKind::ConversionRate,
    MetricKind::EngagementRate,
];

const ALL_METRICS: [MetricKind; 6] = [
    MetricKind::ClickThroughRate,
    MetricKind::ConversionRate,
    MetricKind::MeanRating,
    MetricKind::ResponseTimeMs,
    MetricKind::ErrorRate,
    MetricKind::EngagementRate,
];

/// Relative change per metric. Mean rating is only compared when both
/// sides carry ratings.
pub fn metric_changes(
    baseline: &MetricAggregate,
    current: &MetricAggregate,
) -> BTreeMap<MetricKind, f64> {
    ALL_METRICS
        .into_iter()
        .filter(|kind| {
            *kind != MetricKind::MeanRating
                || (baseline.rated_samples > 0 && current.rated_samples > 0)
        })
        .map(|kind| (kind, relative_change(baseline.metric(kind), current.metric(kind))))
        .collect()
}

pub fn signals(
    baseline: &MetricAggregate,
    current: &MetricAggregate,
    changes: &BTreeMap<MetricKind, f64>,
    thresholds: &DriftThresholds,
) -> DriftSignals {
    let performance = changes
        .iter()
        .filter(|(kind, change)| {
            performance_threshold(**kind, thresholds).is_some_and(|limit| **change > limit)
        })
        .map(|(_, change)| *change)
        .fold(0.0, f64::max);

    let largest_psi = psi(&baseline.response_time_histogram, &current.response_time_histogram)
        .max(psi(&baseline.rating_histogram, &current.rating_histogram));
    let data = if largest_psi >= thresholds.psi {
        largest_psi
    } else {
        0.0
    };

    let behavioral = CONCEPT_METRICS
        .iter()
        .filter_map(|kind| changes.get(kind).copied())
        .fold(0.0, f64::max);
    let concept = if behavioral > thresholds.concept {
        behavioral
    } else {
        0.0
    };

    DriftSignals {
        performance,
        data,
        concept,
    }
}

/// Signal producing the overall score. Ties go to performance, then
/// concept, then data.
pub fn classify(signals: &DriftSignals) -> (DriftType, f64) {
    let ranked = [
        (DriftType::Performance, signals.performance),
        (DriftType::Concept, signals.concept),
        (DriftType::Data, signals.data),
    ];
    ranked
        .into_iter()
        .fold((DriftType::None, 0.0), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        })
}

pub fn recommend(signals: &DriftSignals, thresholds: &DriftThresholds) -> DriftRecommendation {
    if signals.performance > thresholds.retrain || signals.concept > 0.0 {
        DriftRecommendation::Retrain
    } else if signals.performance > 0.0 {
        DriftRecommendation::AdjustParameters
    } else {
        DriftRecommendation::Investigate
    }
}

pub fn evaluate(
    key: &ModelKey,
    baseline: &MetricAggregate,
    current: &MetricAggregate,
    thresholds: &DriftThresholds,
    now: DateTime<Utc>,
) -> DriftResult {
    let changes = metric_changes(baseline, current);
    let signals = signals(baseline, current, &changes, thresholds);
    let (kind, score) = classify(&signals);
    let detected = score > thresholds.declaration;

    DriftResult {
        model_version: key.model_version.clone(),
        algorithm: key.algorithm,
        is_drift_detected: detected,
        drift_type: if detected { kind } else { DriftType::None },
        drift_score: score,
        detection_method: METHOD_STATISTICAL.to_string(),
        recommendation: detected.then(|| recommend(&signals, thresholds)),
        signals,
        metric_changes: changes,
        sample_count: current.sample_count,
        detected_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_baseline_change() {
        assert_eq!(relative_change(0.0, 0.0), 0.0);
        assert_eq!(relative_change(0.0, 0.2), 1.0);
        assert!((relative_change(0.3, 0.15) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn psi_of_identical_histograms_is_zero() {
        let mut h = Histogram::new(&[1.0, 2.0]);
        for v in [0.5, 1.5, 1.5, 3.0] {
            h.observe(v);
        }
        assert!(psi(&h, &h).abs() < 1e-12);
        assert_eq!(psi(&h, &Histogram::new(&[1.0, 2.0])), 0.0);
    }

    #[test]
    fn psi_grows_with_shift() {
        let mut fast = Histogram::new(&[100.0]);
        let mut slow = Histogram::new(&[100.0]);
        for _ in 0..10 {
            fast.observe(10.0);
            slow.observe(500.0);
        }
        assert!(psi(&fast, &slow) > 1.0);
    }

    #[test]
    fn ties_prefer_performance_then_concept() {
        let tied = DriftSignals {
            performance: 0.3,
            data: 0.3,
            concept: 0.3,
        };
        assert_eq!(classify(&tied).0, DriftType::Performance);
        let concept_data = DriftSignals {
            performance: 0.0,
            data: 0.4,
            concept: 0.4,
        };
        assert_eq!(classify(&concept_data).0, DriftType::Concept);
        assert_eq!(classify(&DriftSignals::default()).0, DriftType::None);
    }

    #[test]
    fn recommendation_ladder() {
        let t = DriftThresholds::default();
        let signals = |performance, data, concept| DriftSignals {
            performance,
            data,
            concept,
        };
        assert_eq!(recommend(&signals(0.5, 0.0, 0.0), &t), DriftRecommendation::Retrain);
        assert_eq!(recommend(&signals(0.2, 0.0, 0.16), &t), DriftRecommendation::Retrain);
        assert_eq!(
            recommend(&signals(0.2, 0.0, 0.0), &t),
            DriftRecommendation::AdjustParameters
        );
        assert_eq!(recommend(&signals(0.0, 0.3, 0.0), &t), DriftRecommendation::Investigate);
    }
}
