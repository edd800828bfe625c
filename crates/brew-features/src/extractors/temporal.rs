use std::collections::BTreeMap;

use chrono::{Datelike, Duration};

use brew_core::models::{Season, TemporalFeatures, TimeOfDay, TrendTag};

use super::{days_between, ExtractionInput};

/// Width of the recent and prior windows compared for activity trends.
const TREND_WINDOW_DAYS: i64 = 7;
/// Ratio between windows that counts as a trend.
const TREND_RATIO: f64 = 1.5;
/// Minimum events in the dominant window before a trend is reported.
const TREND_MIN_EVENTS: usize = 2;
/// Minimum events before routine and weekend tags are reported.
const ROUTINE_MIN_EVENTS: usize = 3;
const ROUTINE_SHARE: f64 = 0.5;

pub fn extract(input: &ExtractionInput<'_>) -> TemporalFeatures {
    let events = input.events;
    let total = events.len();

    let mut season_counts: BTreeMap<Season, usize> = Season::ALL.iter().map(|s| (*s, 0)).collect();
    for event in events {
        *season_counts
            .entry(Season::from_month(event.timestamp.month()))
            .or_insert(0) += 1;
    }
    let seasonal_weights = season_counts
        .into_iter()
        .map(|(season, count)| {
            let weight = if total == 0 {
                1.0 / Season::ALL.len() as f64
            } else {
                count as f64 / total as f64
            };
            (season, weight)
        })
        .collect();

    let days_since_last_activity = events
        .iter()
        .map(|e| e.timestamp)
        .max()
        .map(|last| days_between(last, input.now));

    TemporalFeatures {
        seasonal_weights,
        trend_tags: trend_tags(input),
        days_since_last_activity,
    }
}

fn trend_tags(input: &ExtractionInput<'_>) -> Vec<TrendTag> {
    let events = input.events;
    let mut tags = Vec::new();

    let window = Duration::days(TREND_WINDOW_DAYS);
    let recent_start = input.now - window;
    let prior_start = recent_start - window;
    let recent = events.iter().filter(|e| e.timestamp > recent_start).count();
    let prior = events
        .iter()
        .filter(|e| e.timestamp > prior_start && e.timestamp <= recent_start)
        .count();
    if recent >= TREND_MIN_EVENTS && recent as f64 > prior as f64 * TREND_RATIO {
        tags.push(TrendTag::IncreasingActivity);
    } else if prior >= TREND_MIN_EVENTS && (recent as f64) * TREND_RATIO < prior as f64 {
        tags.push(TrendTag::DecreasingActivity);
    }

    if events.len() >= ROUTINE_MIN_EVENTS {
        let (mut weekend, mut morning, mut evening) = (0usize, 0usize, 0usize);
        for event in events {
            if matches!(event.day_of_week().as_str(), "saturday" | "sunday") {
                weekend += 1;
            }
            match event.time_of_day() {
                TimeOfDay::Morning => morning += 1,
                TimeOfDay::Evening => evening += 1,
                _ => {}
            }
        }
        let share = |count: usize| count as f64 / events.len() as f64;
        if share(weekend) > ROUTINE_SHARE {
            tags.push(TrendTag::WeekendFocused);
        }
        if share(morning) >= ROUTINE_SHARE {
            tags.push(TrendTag::MorningRoutine);
        }
        if share(evening) >= ROUTINE_SHARE {
            tags.push(TrendTag::EveningRoutine);
        }
    }
    tags
}
