//! RecommendationEngine: resolve algorithm → features → candidates → score
//! → context modifiers → order → truncate → explain. Samples for served
//! requests are held until feedback arrives or the feedback window lapses.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use brew_core::config::{span_from_secs, RecommendationConfig};
use brew_core::constants::{MAX_RATING, MIN_RATING};
use brew_core::errors::{BrewError, BrewResult, EntityKind, ValidationError};
use brew_core::models::{
    Algorithm, PerformanceSample, RankedItem, RecommendationFeedback, RecommendationRequest,
    RecommendationResponse, UserFeatureSnapshot, VariantOutcome,
};
use brew_core::traits::{ICatalog, IEventStore, IMetricsSink, ISocialGraph};
use brew_features::FeatureEngine;
use brew_serving::{ResolvedModel, ServingRegistry};

use crate::feedback::{PendingFeedback, PendingRequest};
use crate::ranking::{self, ScoredItem};
use crate::scoring::{self, ScoringInput};
use crate::{candidates, context, reasons};

pub struct RecommendationEngine {
    features: Arc<FeatureEngine>,
    catalog: Arc<dyn ICatalog>,
    store: Arc<dyn IEventStore>,
    serving: Arc<ServingRegistry>,
    social: Option<Arc<dyn ISocialGraph>>,
    sink: Option<Arc<dyn IMetricsSink>>,
    pending: PendingFeedback,
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(
        features: Arc<FeatureEngine>,
        catalog: Arc<dyn ICatalog>,
        store: Arc<dyn IEventStore>,
        serving: Arc<ServingRegistry>,
        config: RecommendationConfig,
    ) -> Self {
        Self {
            features,
            catalog,
            store,
            serving,
            social: None,
            sink: None,
            pending: PendingFeedback::new(
                config.max_pending_feedback,
                span_from_secs(config.feedback_window_secs),
            ),
            config,
        }
    }

    pub fn with_social_graph(mut self, graph: Arc<dyn ISocialGraph>) -> Self {
        self.social = Some(graph);
        self
    }

    /// Every call submits one performance sample here: failed calls at once,
    /// served calls with their feedback or after the feedback window.
    pub fn with_metrics_sink(mut self, sink: Arc<dyn IMetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    pub fn generate_recommendations(
        &self,
        user_id: &str,
        request: &RecommendationRequest,
    ) -> BrewResult<RecommendationResponse> {
        self.generate_recommendations_at(user_id, request, Utc::now())
    }

    pub fn generate_recommendations_at(
        &self,
        user_id: &str,
        request: &RecommendationRequest,
        now: DateTime<Utc>,
    ) -> BrewResult<RecommendationResponse> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "userId" }.into());
        }
        let started = Instant::now();
        let resolved = match request.algorithm {
            Some(algorithm) => self.serving.resolve_for(algorithm),
            None => self.serving.resolve_default(user_id),
        };
        let span = info_span!(
            "recommend",
            user_id,
            algorithm = %resolved.algorithm,
            model_version = %resolved.model_version
        );
        let _guard = span.enter();

        let outcome = self.rank(user_id, request, &resolved, now);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

        self.serving
            .record_request(&resolved.model_name, &resolved.model_version);
        if let Some(assignment) = &resolved.assignment {
            if let Err(err) = self.serving.record_variant_outcome(
                &assignment.test_id,
                assignment.variant_index,
                VariantOutcome::Request,
            ) {
                warn!(event = "variant_outcome_dropped", test_id = %assignment.test_id, error = %err);
            }
        }

        let (algorithm, errored) = match &outcome {
            Ok(response) => (response.algorithm, false),
            Err(_) => (resolved.algorithm, true),
        };
        let sample = PerformanceSample {
            timestamp: now,
            model_version: resolved.model_version.clone(),
            algorithm,
            response_time_ms: elapsed_ms,
            clicked: false,
            converted: false,
            rating: None,
            errored,
        };
        match &outcome {
            Ok(response) => {
                let pending = PendingRequest {
                    sample,
                    assignment: resolved.assignment.clone(),
                };
                if let Err(pending) = self.pending.hold(response.request_id.clone(), pending) {
                    debug!(event = "feedback_buffer_full", request_id = %response.request_id);
                    self.submit(pending.sample);
                }
            }
            Err(_) => self.submit(sample),
        }

        match &outcome {
            Ok(response) => info!(
                event = "recommendations_generated",
                items = response.items.len(),
                algorithm = %response.algorithm,
                cold_start = response.cold_start,
                elapsed_ms
            ),
            Err(err) => warn!(
                event = "recommendations_failed",
                code = err.error_code(),
                error = %err,
                elapsed_ms
            ),
        }
        outcome
    }

    /// Fold the user's reaction into the served request's sample and record
    /// click/conversion outcomes for its experiment arm.
    pub fn record_feedback(
        &self,
        request_id: &str,
        feedback: &RecommendationFeedback,
    ) -> BrewResult<()> {
        if request_id.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "requestId" }.into());
        }
        if let Some(value) = feedback.rating {
            if !value.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&value) {
                return Err(ValidationError::RatingOutOfRange {
                    value,
                    min: MIN_RATING,
                    max: MAX_RATING,
                }
                .into());
            }
        }
        let PendingRequest {
            mut sample,
            assignment,
        } = self
            .pending
            .take(request_id)
            .ok_or_else(|| BrewError::not_found(EntityKind::Request, request_id))?;

        sample.clicked = feedback.clicked;
        sample.converted = feedback.converted;
        sample.rating = feedback.rating;

        if let Some(assignment) = &assignment {
            let outcomes = feedback
                .clicked
                .then_some(VariantOutcome::Click)
                .into_iter()
                .chain(feedback.converted.then_some(VariantOutcome::Conversion));
            for outcome in outcomes {
                if let Err(err) = self.serving.record_variant_outcome(
                    &assignment.test_id,
                    assignment.variant_index,
                    outcome,
                ) {
                    warn!(event = "variant_outcome_dropped", test_id = %assignment.test_id, error = %err);
                }
            }
        }

        info!(
            event = "feedback_recorded",
            request_id,
            clicked = feedback.clicked,
            converted = feedback.converted,
            rated = feedback.rating.is_some()
        );
        self.submit(sample);
        Ok(())
    }

    /// Submit the samples of requests whose feedback window has lapsed.
    /// Returns how many were flushed.
    pub fn flush_expired_feedback(&self, now: DateTime<Utc>) -> usize {
        let expired = self.pending.expire(now);
        let flushed = expired.len();
        for pending in expired {
            self.submit(pending.sample);
        }
        flushed
    }

    /// Served requests still waiting for feedback.
    pub fn pending_feedback(&self) -> usize {
        self.pending.len()
    }

    fn submit(&self, sample: PerformanceSample) {
        if let Some(sink) = &self.sink {
            sink.submit(sample);
        }
    }

    fn rank(
        &self,
        user_id: &str,
        request: &RecommendationRequest,
        resolved: &ResolvedModel,
        now: DateTime<Utc>,
    ) -> BrewResult<RecommendationResponse> {
        let snapshot = self
            .features
            .extract_user_features_at(user_id, false, now)
            .unwrap_or_else(|err| {
                warn!(event = "features_degraded", user_id, code = err.error_code(), error = %err);
                Arc::new(UserFeatureSnapshot::default_for(user_id, now))
            });
        let cold_start = snapshot.is_default;
        let algorithm = if cold_start {
            Algorithm::Popularity
        } else {
            resolved.algorithm
        };

        let candidates = candidates::gather(
            self.catalog.as_ref(),
            self.store.as_ref(),
            user_id,
            &request.exclude_item_ids,
            self.config.candidate_pool_size,
        )?;
        let input = ScoringInput {
            user_id,
            snapshot: &snapshot,
            candidates: &candidates,
            store: self.store.as_ref(),
            social: self.social.as_deref(),
            config: &self.config,
            weights: &self.features.config().interaction_weights,
            now,
        };
        let scored = scoring::score(algorithm, &input)?;

        let mut ranked: Vec<ScoredItem<'_>> = candidates
            .iter()
            .filter(|item| !scored.scored_only || scored.scores.contains_key(&item.id))
            .map(|item| ScoredItem {
                item,
                score: scored.get(&item.id)
                    * context::modifier(item, &request.context, &self.config),
            })
            .collect();
        ranking::order(&mut ranked);
        ranked.truncate(ranking::effective_limit(request.limit, &self.config));

        let items = ranked
            .iter()
            .enumerate()
            .map(|(index, entry)| RankedItem {
                item_id: entry.item.id.clone(),
                name: entry.item.name.clone(),
                score: entry.score,
                rank: index + 1,
                reason: request.include_reasons.then(|| {
                    reasons::explain(entry.item, &scored, &snapshot.preference, &self.config)
                }),
            })
            .collect();

        Ok(RecommendationResponse {
            request_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            items,
            algorithm: scored.algorithm,
            model_version: resolved.model_version.clone(),
            cold_start,
            ab_test: resolved.assignment.clone(),
            generated_at: now,
        })
    }
}
