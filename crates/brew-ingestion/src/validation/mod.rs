//! Field-level checks on untrusted interaction records.
//!
//! Every rule runs, so a report lists all problems at once. Warnings never
//! make a record invalid.

mod identifiers;

pub use identifiers::is_valid_identifier;

use chrono::{DateTime, Duration, Utc};

use brew_core::config::span_secs;
use brew_core::constants::{MAX_RATING, MIN_RATING};
use brew_core::errors::ValidationError;
use brew_core::models::{EventMetadata, InteractionType, RawInteraction, ValidationReport};

/// A record that passed validation, with normalized fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInteraction {
    pub user_id: String,
    pub item_id: String,
    pub interaction_type: InteractionType,
    /// Only present for ratings.
    pub value: Option<f64>,
    /// Millisecond precision, UTC.
    pub timestamp: DateTime<Utc>,
    pub metadata: EventMetadata,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Validator {
    max_future_skew: Duration,
}

impl Validator {
    pub fn new(max_future_skew_secs: i64) -> Self {
        Self {
            max_future_skew: span_secs(max_future_skew_secs),
        }
    }

    pub fn validate(&self, raw: &RawInteraction, now: DateTime<Utc>) -> ValidationReport {
        match self.check(raw, now) {
            Ok(valid) => ValidationReport {
                is_valid: true,
                errors: Vec::new(),
                warnings: valid.warnings,
            },
            Err(report) => report,
        }
    }

    /// Validate and normalize. An absent timestamp becomes `now`.
    pub fn check(
        &self,
        raw: &RawInteraction,
        now: DateTime<Utc>,
    ) -> Result<ValidatedInteraction, ValidationReport> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let user_id = identifier(raw.user_id.as_deref(), "userId", &mut errors);
        let item_id = identifier(raw.item_id.as_deref(), "itemId", &mut errors);

        let interaction_type = match raw.interaction_type.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push(ValidationError::MissingField {
                    field: "interactionType",
                });
                None
            }
            Some(value) => match value.parse::<InteractionType>() {
                Ok(t) => Some(t),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
        };

        let value = match interaction_type {
            Some(InteractionType::Rating) => rating(raw.value, &mut errors),
            Some(_) => {
                if raw.value.is_some() {
                    warnings.push("value is only kept for rating events; dropped".to_string());
                }
                None
            }
            None => None,
        };

        let timestamp = match raw.timestamp.as_deref() {
            None => Some(truncate_to_millis(now)),
            Some(text) => match DateTime::parse_from_rfc3339(text.trim()) {
                Ok(parsed) => Some(truncate_to_millis(parsed.with_timezone(&Utc))),
                Err(_) => {
                    errors.push(ValidationError::MalformedTimestamp {
                        value: text.to_string(),
                    });
                    None
                }
            },
        };
        if let Some(ts) = timestamp {
            if ts > now + self.max_future_skew {
                warnings.push(format!(
                    "timestamp {} is more than {}s ahead of ingestion time",
                    ts.to_rfc3339(),
                    self.max_future_skew.num_seconds()
                ));
            }
        }

        match (user_id, item_id, interaction_type, timestamp) {
            (Some(user_id), Some(item_id), Some(interaction_type), Some(timestamp))
                if errors.is_empty() =>
            {
                Ok(ValidatedInteraction {
                    user_id,
                    item_id,
                    interaction_type,
                    value,
                    timestamp,
                    metadata: raw.metadata.clone(),
                    warnings,
                })
            }
            _ => Err(ValidationReport {
                is_valid: false,
                errors,
                warnings,
            }),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(brew_core::config::defaults::DEFAULT_MAX_FUTURE_SKEW_SECS)
    }
}

fn identifier(
    value: Option<&str>,
    field: &'static str,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    match value.map(str::trim) {
        None | Some("") => {
            errors.push(ValidationError::MissingField { field });
            None
        }
        Some(v) if !is_valid_identifier(v) => {
            errors.push(ValidationError::InvalidIdentifier {
                field,
                value: v.to_string(),
            });
            None
        }
        Some(v) => Some(v.to_string()),
    }
}

fn rating(value: Option<f64>, errors: &mut Vec<ValidationError>) -> Option<f64> {
    let (min, max) = (MIN_RATING, MAX_RATING);
    match value {
        None => {
            errors.push(ValidationError::MissingRating { min, max });
            None
        }
        Some(v) if !v.is_finite() || v < min || v > max => {
            errors.push(ValidationError::RatingOutOfRange { value: v, min, max });
            None
        }
        Some(v) => Some(v),
    }
}

/// Storage keeps milliseconds; truncating here keeps dedup keys and
/// round trips exact.
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}
