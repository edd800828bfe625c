//! Window summaries.

use chrono::{DateTime, Utc};

use brew_core::models::{Histogram, MetricAggregate, PerformanceSample};

/// Response-time bin edges (ms).
pub const RESPONSE_TIME_EDGES: [f64; 6] = [50.0, 100.0, 200.0, 500.0, 1_000.0, 2_000.0];
/// Rating bin edges. Ratings are in [1, 5], so the first bin holds ratings below 2.
pub const RATING_EDGES: [f64; 4] = [2.0, 3.0, 4.0, 5.0];

pub fn aggregate<'a, I>(samples: I) -> MetricAggregate
where
    I: IntoIterator<Item = &'a PerformanceSample>,
{
    let mut response_times = Histogram::new(&RESPONSE_TIME_EDGES);
    let mut ratings = Histogram::new(&RATING_EDGES);
    let (mut count, mut clicks, mut conversions, mut errors, mut engaged) = (0usize, 0, 0, 0, 0);
    let (mut rated, mut rating_sum, mut response_sum) = (0usize, 0.0, 0.0);
    let mut start: Option<DateTime<Utc>> = None;
    let mut end: Option<DateTime<Utc>> = None;

    for sample in samples {
        count += 1;
        clicks += usize::from(sample.clicked);
        conversions += usize::from(sample.converted);
        errors += usize::from(sample.errored);
        engaged += usize::from(sample.is_engaged());
        response_sum += sample.response_time_ms;
        response_times.observe(sample.response_time_ms);
        if let Some(rating) = sample.rating {
            rated += 1;
            rating_sum += rating;
            ratings.observe(rating);
        }
        start = Some(start.map_or(sample.timestamp, |s| s.min(sample.timestamp)));
        end = Some(end.map_or(sample.timestamp, |e| e.max(sample.timestamp)));
    }

    let rate = |n: usize| if count == 0 { 0.0 } else { n as f64 / count as f64 };
    MetricAggregate {
        sample_count: count,
        click_through_rate: rate(clicks),
        conversion_rate: rate(conversions),
        mean_rating: if rated == 0 { 0.0 } else { rating_sum / rated as f64 },
        rated_samples: rated,
        mean_response_time_ms: if count == 0 { 0.0 } else { response_sum / count as f64 },
        error_rate: rate(errors),
        engagement_rate: rate(engaged),
        response_time_histogram: response_times,
        rating_histogram: ratings,
        window_start: start,
        window_end: end,
    }
}
