use std::collections::BTreeMap;

use chrono::Duration;

use brew_core::config::span_secs;
use brew_core::models::{BehavioralFeatures, InteractionEvent, TimeOfDay};

use super::{days_between, fractions, mode, ExtractionInput};

pub fn extract(input: &ExtractionInput<'_>) -> BehavioralFeatures {
    let events = input.events;
    let total = events.len();
    if total == 0 {
        return BehavioralFeatures::default();
    }

    let mut interaction_counts = BTreeMap::new();
    let mut time_counts: BTreeMap<TimeOfDay, usize> = BTreeMap::new();
    let mut day_counts: BTreeMap<String, usize> = BTreeMap::new();
    for event in events {
        *interaction_counts.entry(event.interaction_type).or_insert(0) += 1;
        *time_counts.entry(event.time_of_day()).or_insert(0) += 1;
        *day_counts.entry(event.day_of_week()).or_insert(0) += 1;
    }

    let earliest = events.iter().map(|e| e.timestamp).min().unwrap_or(input.now);
    let span_days = days_between(earliest, input.now).max(1.0);

    let sessions = sessions(
        events,
        span_secs(input.config.session_gap_minutes.saturating_mul(60)),
    );
    let session_count = sessions.len();
    let total_minutes: f64 = sessions
        .iter()
        .map(|s| (s.end - s.start).num_seconds() as f64 / 60.0)
        .sum();

    let time_of_day_distribution = fractions(&time_counts, total);
    let day_of_week_distribution = fractions(&day_counts, total);

    BehavioralFeatures {
        total_interactions: total,
        interaction_counts,
        interaction_frequency: total as f64 / span_days,
        session_count,
        avg_session_length_minutes: total_minutes / session_count.max(1) as f64,
        avg_events_per_session: total as f64 / session_count.max(1) as f64,
        preferred_time_of_day: mode(&time_of_day_distribution),
        preferred_day_of_week: mode(&day_of_week_distribution),
        time_of_day_distribution,
        day_of_week_distribution,
    }
}

pub(crate) struct Session {
    pub start: chrono::DateTime<chrono::Utc>,
    pub end: chrono::DateTime<chrono::Utc>,
    pub events: usize,
}

/// Split events into sessions wherever consecutive events are more than
/// `gap` apart.
pub(crate) fn sessions(events: &[InteractionEvent], gap: Duration) -> Vec<Session> {
    let mut times: Vec<_> = events.iter().map(|e| e.timestamp).collect();
    times.sort_unstable();

    let mut out: Vec<Session> = Vec::new();
    for ts in times {
        match out.last_mut() {
            Some(current) if ts - current.end <= gap => {
                current.end = ts;
                current.events += 1;
            }
            _ => out.push(Session {
                start: ts,
                end: ts,
                events: 1,
            }),
        }
    }
    out
}
