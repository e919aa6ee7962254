//! Time-of-day engagement tiers

use chrono::{DateTime, TimeZone, Timelike};

use crate::analytics::models::{Engagement, EngagementLevel};

const HIGH_REASON: &str = "Peak cognitive performance hours";
const MEDIUM_REASON: &str = "Normal activity hours";
const LOW_REASON: &str = "Off-peak hours";

/// Classify an hour of the day (0-23)
///
/// - high: 9-11 and 14-16 inclusive
/// - medium: 7-8, 12-13 and 17-19
/// - low: everything else
pub fn classify_hour(hour: u32) -> Engagement {
    let (level, reason) = match hour {
        9..=11 | 14..=16 => (EngagementLevel::High, HIGH_REASON),
        7..=8 | 12..=13 | 17..=19 => (EngagementLevel::Medium, MEDIUM_REASON),
        _ => (EngagementLevel::Low, LOW_REASON),
    };

    Engagement {
        level,
        reason: reason.to_string(),
    }
}

/// Classify a timestamp by its hour in the timestamp's own offset
pub fn classify_engagement<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> Engagement {
    classify_hour(timestamp.hour())
}
