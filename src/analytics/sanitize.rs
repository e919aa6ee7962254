//! Privacy boundary between scan events and the analytics store

use crate::analytics::models::{AnalyticsEvent, ReferrerType, SanitizedRecord};

/// Drop the IP, user-agent, target URL and latency from an event and
/// collapse the referrer to direct/referral.
pub fn sanitize_for_storage(event: AnalyticsEvent) -> SanitizedRecord {
    let metrics = event.metrics;
    let referrer_type = if metrics.referrer == "direct" {
        ReferrerType::Direct
    } else {
        ReferrerType::Referral
    };

    SanitizedRecord {
        timestamp: event.timestamp,
        slug: event.slug,
        device: metrics.device,
        browser: metrics.browser,
        engagement: metrics.engagement,
        quality_score: metrics.quality_score,
        fingerprint: metrics.fingerprint,
        referrer_type,
    }
}
