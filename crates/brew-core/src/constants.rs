/// brewlens system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Layout version of [`crate::models::UserFeatureSnapshot`]. Bump when fields change meaning.
pub const FEATURE_SCHEMA_VERSION: u32 = 2;

/// Maximum batch size for bulk operations.
pub const MAX_BULK_BATCH_SIZE: usize = 1000;

/// Maximum identifier length accepted by ingestion.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Lowest and highest accepted rating values.
pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// Number of most recent events considered for the exploration rate.
pub const EXPLORATION_WINDOW: usize = 100;

/// Neutral value used for social placeholder scores.
pub const NEUTRAL_SOCIAL_SCORE: f64 = 0.5;

/// Model name consulted when a request does not name an algorithm.
pub const DEFAULT_MODEL_NAME: &str = "coffee-recommender";

/// Version reported when no model descriptor is registered.
pub const BUILTIN_MODEL_VERSION: &str = "builtin";

/// Tolerance when checking that A/B traffic shares sum to 1.0.
pub const TRAFFIC_SHARE_TOLERANCE: f64 = 1e-6;

/// Longest configurable duration, in seconds (about ten years).
pub const MAX_SPAN_SECS: i64 = 315_576_000;
