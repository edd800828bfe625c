use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// What a user did to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    View,
    Click,
    Search,
    Favorite,
    Purchase,
    Rating,
    Share,
    Review,
}

impl InteractionType {
    pub const ALL: [InteractionType; 8] = [
        Self::View,
        Self::Click,
        Self::Search,
        Self::Favorite,
        Self::Purchase,
        Self::Rating,
        Self::Share,
        Self::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Click => "click",
            Self::Search => "search",
            Self::Favorite => "favorite",
            Self::Purchase => "purchase",
            Self::Rating => "rating",
            Self::Share => "share",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownInteractionType {
                value: s.to_string(),
            })
    }
}

/// Coarse time-of-day bucket derived from the event hour (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [Self::Morning, Self::Afternoon, Self::Evening, Self::Night];

    /// morning 06–11, afternoon 12–17, evening 18–21, night 22–05.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=21 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn of(timestamp: DateTime<Utc>) -> Self {
        Self::from_hour(timestamp.hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase English weekday name, e.g. "monday".
pub fn day_of_week(timestamp: DateTime<Utc>) -> String {
    match timestamp.weekday() {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
    .to_string()
}

/// Context attached to an event. Unknown keys are preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Untrusted interaction record as received from the boundary layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawInteraction {
    pub user_id: Option<String>,
    pub item_id: Option<String>,
    pub interaction_type: Option<String>,
    pub value: Option<f64>,
    /// RFC 3339. Absent means "now".
    pub timestamp: Option<String>,
    pub metadata: EventMetadata,
}

/// A validated, enriched, immutable interaction fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub interaction_type: InteractionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub metadata: EventMetadata,
    pub ingested_at: DateTime<Utc>,
}

impl InteractionEvent {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            user_id: self.user_id.clone(),
            item_id: self.item_id.clone(),
            interaction_type: self.interaction_type,
            timestamp_ms: self.timestamp.timestamp_millis(),
        }
    }

    /// Stored bucket, or the one derived from the timestamp.
    pub fn time_of_day(&self) -> TimeOfDay {
        self.metadata
            .time_of_day
            .unwrap_or_else(|| TimeOfDay::of(self.timestamp))
    }

    pub fn day_of_week(&self) -> String {
        self.metadata
            .day_of_week
            .clone()
            .unwrap_or_else(|| day_of_week(self.timestamp))
    }

    /// Rating, favorite, purchase, share and review count as positive signals.
    /// A rating only counts when it is 4 or above.
    pub fn is_positive(&self) -> bool {
        match self.interaction_type {
            InteractionType::Rating => self.value.is_some_and(|v| v >= 4.0),
            InteractionType::Favorite
            | InteractionType::Purchase
            | InteractionType::Share
            | InteractionType::Review => true,
            _ => false,
        }
    }
}

/// Identity of an event for de-duplication: `(userId, itemId, interactionType, timestamp)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    pub user_id: String,
    pub item_id: String,
    pub interaction_type: InteractionType,
    pub timestamp_ms: i64,
}

/// Outcome of validating one raw record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
}

/// Machine-readable failure attached to ingestion results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestFailure {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<IngestFailure>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchOptions {
    /// Clamped to `1..=MAX_BULK_BATCH_SIZE`; configured default when absent.
    pub batch_size: Option<usize>,
    /// Configured default when absent.
    pub skip_duplicates: Option<bool>,
}

/// Per-item failure in a batch, located by input index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemError {
    pub index: usize,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Events newly stored.
    pub processed: usize,
    pub failed: usize,
    /// Events skipped because they were already stored or repeated in the batch.
    pub duplicates: usize,
    pub errors: Vec<BatchItemError>,
    /// Remaining chunks were skipped after an unrecoverable storage failure.
    pub aborted: bool,
}
