// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "brewlens.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// --- Ingestion ---
pub const DEFAULT_INGEST_BATCH_SIZE: usize = 500;
pub const DEFAULT_SKIP_DUPLICATES: bool = true;
pub const DEFAULT_MAX_FUTURE_SKEW_SECS: i64 = 300; // 5 minutes
pub const DEFAULT_MAX_CONSECUTIVE_CHUNK_FAILURES: usize = 3;

// --- Features ---
pub const DEFAULT_FEATURE_CACHE_TTL_SECS: u64 = 3_600; // 1 hour
pub const DEFAULT_FEATURE_CACHE_MAX_ENTRIES: u64 = 10_000;
pub const DEFAULT_FEATURE_SWEEP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_MAX_EVENTS_WINDOW: usize = 1_000;
pub const DEFAULT_SESSION_GAP_MINUTES: i64 = 30;
pub const DEFAULT_PREFERENCE_TOP_N: usize = 5;
pub const DEFAULT_RECENCY_DECAY_RATE: f64 = 0.01;
pub const DEFAULT_FEATURE_BATCH_CHUNK_SIZE: usize = 50;
pub const DEFAULT_FEATURE_WORKER_THREADS: usize = 4;

// Interaction type weights used for preference scoring.
pub const WEIGHT_VIEW: f64 = 1.0;
pub const WEIGHT_CLICK: f64 = 1.5;
pub const WEIGHT_SEARCH: f64 = 0.5;
pub const WEIGHT_FAVORITE: f64 = 4.0;
pub const WEIGHT_PURCHASE: f64 = 5.0;
pub const WEIGHT_RATING: f64 = 3.0;
pub const WEIGHT_SHARE: f64 = 2.5;
pub const WEIGHT_REVIEW: f64 = 3.5;

// --- Recommendation ---
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;
pub const DEFAULT_MAX_RECOMMENDATION_LIMIT: usize = 100;
pub const DEFAULT_CANDIDATE_POOL_SIZE: usize = 500;
pub const DEFAULT_POPULARITY_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_NEIGHBOR_COUNT: usize = 25;
pub const DEFAULT_HYBRID_COLLABORATIVE_WEIGHT: f64 = 0.4;
pub const DEFAULT_HYBRID_CONTENT_WEIGHT: f64 = 0.4;
pub const DEFAULT_HYBRID_POPULARITY_WEIGHT: f64 = 0.2;
pub const DEFAULT_DISCOVERY_NOVELTY_WEIGHT: f64 = 0.4;
pub const DEFAULT_CONTEXT_ROAST_BOOST: f64 = 1.1;
pub const DEFAULT_CONTEXT_LOCATION_BOOST: f64 = 1.1;
pub const DEFAULT_FEEDBACK_WINDOW_SECS: u64 = 1_800; // 30 minutes
pub const DEFAULT_MAX_PENDING_FEEDBACK: usize = 10_000;

// --- Monitoring ---
pub const DEFAULT_METRICS_WINDOW_SIZE: usize = 1_000;
pub const DEFAULT_MIN_BASELINE_SAMPLES: usize = 5;
pub const DEFAULT_MIN_DRIFT_SAMPLES: usize = 10;
pub const DEFAULT_CTR_DRIFT_THRESHOLD: f64 = 0.10;
pub const DEFAULT_CONVERSION_DRIFT_THRESHOLD: f64 = 0.10;
pub const DEFAULT_RATING_DRIFT_THRESHOLD: f64 = 0.20;
pub const DEFAULT_RESPONSE_TIME_DRIFT_THRESHOLD: f64 = 0.30;
pub const DEFAULT_ERROR_RATE_DRIFT_THRESHOLD: f64 = 0.05;
pub const DEFAULT_CONCEPT_DRIFT_THRESHOLD: f64 = 0.15;
pub const DEFAULT_DRIFT_DECLARATION_THRESHOLD: f64 = 0.15;
pub const DEFAULT_RETRAIN_THRESHOLD: f64 = 0.30;
pub const DEFAULT_PSI_THRESHOLD: f64 = 0.20;
pub const DEFAULT_ALERT_COOLDOWN_SECS: u64 = 300;
pub const DEFAULT_RETENTION_DAYS: i64 = 7;
pub const DEFAULT_DRIFT_CHECK_INTERVAL_SECS: u64 = 3_600;
pub const DEFAULT_RETENTION_INTERVAL_SECS: u64 = 3_600;
pub const DEFAULT_HEALTHY_RESPONSE_MS: u64 = 100;
pub const DEFAULT_DEGRADED_RESPONSE_MS: u64 = 1_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
