//! Request-context score modifiers.

use brew_core::config::RecommendationConfig;
use brew_core::models::{
    normalize_attribute, AttributeFamily, CoffeeItem, RecommendationContext, TimeOfDay,
};

/// Roast levels that suit a time of day.
pub fn suited_roasts(time: TimeOfDay) -> &'static [&'static str] {
    match time {
        TimeOfDay::Morning => &["light", "medium-light", "medium"],
        TimeOfDay::Afternoon => &["medium", "medium-light"],
        TimeOfDay::Evening => &["medium-dark", "dark"],
        TimeOfDay::Night => &["dark"],
    }
}

/// Multiplier applied to an item's score. 1.0 when nothing in the context applies.
pub fn modifier(item: &CoffeeItem, ctx: &RecommendationContext, config: &RecommendationConfig) -> f64 {
    let mut factor = 1.0;
    if let Some(time) = ctx.time_of_day {
        let suited = suited_roasts(time);
        if item
            .attributes(AttributeFamily::RoastLevel)
            .iter()
            .any(|roast| suited.contains(&roast.as_str()))
        {
            factor *= config.context_roast_boost;
        }
    }
    if let Some(location) = ctx.location.as_deref().map(normalize_attribute) {
        if !location.is_empty() && item.attributes(AttributeFamily::Origin).contains(&location) {
            factor *= config.context_location_boost;
        }
    }
    factor
}
