//! IngestionEngine: validates, enriches and persists interaction events.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use brew_core::config::IngestionConfig;
use brew_core::errors::{BrewError, BrewResult};
use brew_core::events::{
    BatchCompleteEvent, BatchProgressEvent, EventDispatcher, EventIngestedEvent,
};
use brew_core::models::{
    BatchOptions, BatchReport, DedupKey, IngestFailure, IngestResult, InteractionEvent,
    RawInteraction, ValidationReport,
};
use brew_core::traits::{IEventStore, IFeatureCache};

use crate::batch::{self, BatchTally};
use crate::enrichment::enrich;
use crate::validation::Validator;

const CODE_VALIDATION: &str = "VALIDATION_ERROR";
const CODE_DUPLICATE: &str = "DUPLICATE_EVENT";

pub struct IngestionEngine {
    store: Arc<dyn IEventStore>,
    validator: Validator,
    config: IngestionConfig,
    dispatcher: EventDispatcher,
    /// Users with new events get their cached snapshot dropped.
    feature_cache: Option<Arc<dyn IFeatureCache>>,
}

impl IngestionEngine {
    pub fn new(store: Arc<dyn IEventStore>, config: IngestionConfig) -> Self {
        Self {
            store,
            validator: Validator::new(config.max_future_skew_secs),
            config,
            dispatcher: EventDispatcher::new(),
            feature_cache: None,
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: EventDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_feature_cache(mut self, cache: Arc<dyn IFeatureCache>) -> Self {
        self.feature_cache = Some(cache);
        self
    }

    pub fn validate(&self, raw: &RawInteraction) -> ValidationReport {
        self.validator.validate(raw, Utc::now())
    }

    /// Ingest one event. Never returns an error; failures are reported in
    /// the result with a stable code.
    pub fn ingest_single(&self, raw: &RawInteraction) -> IngestResult {
        self.ingest_single_at(raw, Utc::now())
    }

    pub fn ingest_single_at(&self, raw: &RawInteraction, now: DateTime<Utc>) -> IngestResult {
        let valid = match self.validator.check(raw, now) {
            Ok(valid) => valid,
            Err(report) => {
                debug!(event = "ingest_rejected", errors = report.errors.len());
                return IngestResult {
                    success: false,
                    event_id: None,
                    error: Some(IngestFailure {
                        code: CODE_VALIDATION.to_string(),
                        message: join_errors(&report),
                    }),
                    warnings: report.warnings,
                };
            }
        };

        let warnings = valid.warnings.clone();
        let event = enrich(valid, now);
        match self.store.insert_event(&event) {
            Ok(()) => {
                self.after_insert(std::iter::once(event.user_id.as_str()));
                self.dispatcher.emit_event_ingested(&EventIngestedEvent {
                    event_id: event.id.clone(),
                    user_id: event.user_id.clone(),
                    item_id: event.item_id.clone(),
                    interaction_type: event.interaction_type,
                });
                debug!(
                    event = "event_ingested",
                    event_id = %event.id,
                    user_id = %event.user_id,
                    interaction_type = %event.interaction_type
                );
                IngestResult {
                    success: true,
                    event_id: Some(event.id),
                    error: None,
                    warnings,
                }
            }
            Err(err) => {
                if err.is_dependency_failure() {
                    warn!(event = "ingest_store_failed", error = %err);
                }
                IngestResult {
                    success: false,
                    event_id: None,
                    error: Some(IngestFailure {
                        code: err.error_code().to_string(),
                        message: err.to_string(),
                    }),
                    warnings,
                }
            }
        }
    }

    /// Ingest many events in chunks.
    ///
    /// With `skip_duplicates`, events already stored or repeated earlier in the
    /// batch are counted as duplicates; otherwise they are failures with code
    /// `DUPLICATE_EVENT`. A failed chunk marks its items failed and the batch
    /// continues, unless the store is unrecoverable or too many chunks in a
    /// row have failed; then the rest of the batch is aborted.
    pub fn ingest_batch(&self, raw: &[RawInteraction], options: &BatchOptions) -> BatchReport {
        self.ingest_batch_at(raw, options, Utc::now())
    }

    pub fn ingest_batch_at(
        &self,
        raw: &[RawInteraction],
        options: &BatchOptions,
        now: DateTime<Utc>,
    ) -> BatchReport {
        let started = Instant::now();
        let batch_size =
            batch::effective_batch_size(options.batch_size, self.config.default_batch_size);
        let skip_duplicates = options
            .skip_duplicates
            .unwrap_or(self.config.skip_duplicates);
        let chunk_count = batch::chunk_count(raw.len(), batch_size);
        let max_failures = self.config.max_consecutive_chunk_failures.max(1);

        let span = tracing::info_span!("ingest_batch", total = raw.len(), batch_size);
        let _guard = span.enter();

        let mut tally = BatchTally::default();
        let mut seen: HashSet<DedupKey> = HashSet::new();
        let mut consecutive_failures = 0;

        for (chunk_index, chunk) in raw.chunks(batch_size).enumerate() {
            let offset = chunk_index * batch_size;
            let outcome = self.ingest_chunk(
                chunk,
                offset,
                skip_duplicates,
                now,
                &mut seen,
                &mut tally,
            );

            let abort_reason = match outcome {
                Ok(()) => {
                    consecutive_failures = 0;
                    None
                }
                Err(err) => {
                    consecutive_failures += 1;
                    warn!(
                        event = "chunk_failed",
                        chunk_index,
                        consecutive_failures,
                        error = %err
                    );
                    if err.is_unrecoverable() {
                        Some(format!("store unavailable: {err}"))
                    } else if consecutive_failures >= max_failures {
                        Some(format!("{consecutive_failures} consecutive chunk failures"))
                    } else {
                        None
                    }
                }
            };

            let end = offset + chunk.len();
            if let Some(reason) = abort_reason {
                tally.abort(end..raw.len(), &reason);
                warn!(event = "batch_aborted", at_index = end, reason = %reason);
            }

            let progress = tally.report();
            self.dispatcher.emit_batch_progress(&BatchProgressEvent {
                chunk_index,
                chunk_count,
                processed: progress.processed,
                failed: progress.failed,
                duplicates: progress.duplicates,
            });
            if progress.aborted {
                break;
            }
        }

        let report = tally.finish();
        let duration_ms = started.elapsed().as_millis() as u64;
        self.dispatcher.emit_batch_complete(&BatchCompleteEvent {
            total: raw.len(),
            processed: report.processed,
            failed: report.failed,
            duplicates: report.duplicates,
            aborted: report.aborted,
            duration_ms,
        });
        info!(
            event = "batch_complete",
            total = raw.len(),
            processed = report.processed,
            failed = report.failed,
            duplicates = report.duplicates,
            aborted = report.aborted,
            duration_ms
        );
        report
    }

    /// Validate, dedup and write one chunk. On a store error every item still
    /// pending in the chunk has already been marked failed.
    fn ingest_chunk(
        &self,
        chunk: &[RawInteraction],
        offset: usize,
        skip_duplicates: bool,
        now: DateTime<Utc>,
        seen: &mut HashSet<DedupKey>,
        tally: &mut BatchTally,
    ) -> BrewResult<()> {
        let mut pending: Vec<(usize, InteractionEvent)> = Vec::with_capacity(chunk.len());
        let mut chunk_keys: HashSet<DedupKey> = HashSet::new();

        for (i, raw) in chunk.iter().enumerate() {
            let index = offset + i;
            match self.validator.check(raw, now) {
                Ok(valid) => {
                    let event = enrich(valid, now);
                    let key = event.dedup_key();
                    if seen.contains(&key) || !chunk_keys.insert(key) {
                        self.duplicate(index, skip_duplicates, tally);
                    } else {
                        pending.push((index, event));
                    }
                }
                Err(report) => tally.fail(index, CODE_VALIDATION, join_errors(&report)),
            }
        }
        if pending.is_empty() {
            return Ok(());
        }

        let keys: Vec<DedupKey> = pending.iter().map(|(_, e)| e.dedup_key()).collect();
        let stored = match self.store.existing_keys(&keys) {
            Ok(stored) => stored,
            Err(err) => return Err(self.fail_pending(&pending, err, tally)),
        };
        pending.retain(|(index, event)| {
            if stored.contains(&event.dedup_key()) {
                self.duplicate(*index, skip_duplicates, tally);
                false
            } else {
                true
            }
        });
        if pending.is_empty() {
            return Ok(());
        }

        let events: Vec<InteractionEvent> = pending.iter().map(|(_, e)| e.clone()).collect();
        match self.store.insert_events(&events) {
            Ok(inserted) => {
                // Rows lost to a concurrent writer between the check and the write.
                for _ in inserted..events.len() {
                    tally.duplicate();
                }
                tally.processed(inserted);
                seen.extend(events.iter().map(InteractionEvent::dedup_key));
                self.after_insert(events.iter().map(|e| e.user_id.as_str()));
                Ok(())
            }
            Err(err) => Err(self.fail_pending(&pending, err, tally)),
        }
    }

    fn duplicate(&self, index: usize, skip_duplicates: bool, tally: &mut BatchTally) {
        if skip_duplicates {
            tally.duplicate();
        } else {
            tally.fail(index, CODE_DUPLICATE, "event already ingested");
        }
    }

    fn fail_pending(
        &self,
        pending: &[(usize, InteractionEvent)],
        err: BrewError,
        tally: &mut BatchTally,
    ) -> BrewError {
        let message = err.to_string();
        tally.fail_all(pending.iter().map(|(i, _)| *i), err.error_code(), &message);
        err
    }

    fn after_insert<'a>(&self, users: impl Iterator<Item = &'a str>) {
        if let Some(cache) = &self.feature_cache {
            let distinct: HashSet<&str> = users.collect();
            for user_id in distinct {
                cache.invalidate(user_id);
            }
        }
    }

    pub fn store(&self) -> &Arc<dyn IEventStore> {
        &self.store
    }
}

fn join_errors(report: &ValidationReport) -> String {
    report
        .errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
