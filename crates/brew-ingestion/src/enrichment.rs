//! Turns a validated record into a stored event.

use chrono::{DateTime, Utc};

use brew_core::models::{day_of_week, InteractionEvent, TimeOfDay};

use crate::validation::{truncate_to_millis, ValidatedInteraction};

/// Assign an id and fill `timeOfDay`/`dayOfWeek` from the timestamp when the
/// caller did not supply them.
pub fn enrich(valid: ValidatedInteraction, now: DateTime<Utc>) -> InteractionEvent {
    let mut metadata = valid.metadata;
    metadata
        .time_of_day
        .get_or_insert_with(|| TimeOfDay::of(valid.timestamp));
    if metadata.day_of_week.as_deref().map_or(true, str::is_empty) {
        metadata.day_of_week = Some(day_of_week(valid.timestamp));
    }

    InteractionEvent {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: valid.user_id,
        item_id: valid.item_id,
        interaction_type: valid.interaction_type,
        value: valid.value,
        timestamp: valid.timestamp,
        metadata,
        ingested_at: truncate_to_millis(now),
    }
}
