//! Scan context analysis
//!
//! Turns the metadata of one redirect request into [`ScanMetrics`].

use chrono::{DateTime, FixedOffset};

use crate::analytics::classifier::UaClassifier;
use crate::analytics::engagement::classify_engagement;
use crate::analytics::fingerprint::create_fingerprint;
use crate::analytics::models::ScanMetrics;
use crate::analytics::scoring::calculate_quality_score;

/// Stored user-agents are cut to this many characters
pub const MAX_USER_AGENT_CHARS: usize = 200;

/// Request metadata consumed by the builder
#[derive(Debug, Clone)]
pub struct ScanRequest<'a> {
    pub user_agent: Option<&'a str>,
    pub referrer: Option<&'a str>,
    pub client_ip: &'a str,

    /// Arrival time; also used as the event timestamp
    pub now: DateTime<FixedOffset>,

    pub latency_ms: Option<u64>,
}

/// Strip the IPv4-mapped IPv6 prefix
pub fn normalize_ip(ip: &str) -> &str {
    ip.strip_prefix("::ffff:").unwrap_or(ip)
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanContextBuilder {
    classifier: UaClassifier,
}

impl ScanContextBuilder {
    pub fn new(classifier: UaClassifier) -> Self {
        Self { classifier }
    }

    pub fn analyze(&self, request: &ScanRequest<'_>) -> ScanMetrics {
        let user_agent = request.user_agent.unwrap_or("unknown");
        let referrer = match request.referrer.unwrap_or("none") {
            "none" => "direct",
            other => other,
        };
        let ip = normalize_ip(request.client_ip);

        let device = self.classifier.detect_device(user_agent);
        let browser = self.classifier.detect_browser(user_agent);
        let fingerprint = create_fingerprint(ip, user_agent);
        let engagement = classify_engagement(&request.now);
        let quality_score =
            calculate_quality_score(&device, browser, referrer, request.latency_ms);

        ScanMetrics {
            device,
            browser,
            referrer: referrer.to_string(),
            fingerprint,
            engagement,
            quality_score,
            ip: ip.to_string(),
            user_agent: truncate_chars(user_agent, MAX_USER_AGENT_CHARS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::models::{Browser, DeviceType, EngagementLevel};
    use chrono::TimeZone;

    const ANDROID_CHROME: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";

    fn at_hour(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 1, hour, 0, 0)
            .unwrap()
    }

    fn request<'a>(user_agent: Option<&'a str>, referrer: Option<&'a str>) -> ScanRequest<'a> {
        ScanRequest {
            user_agent,
            referrer,
            client_ip: "::ffff:198.51.100.4",
            now: at_hour(10),
            latency_ms: None,
        }
    }

    #[test]
    fn test_direct_mobile_chrome_scan() {
        let metrics = ScanContextBuilder::default().analyze(&request(Some(ANDROID_CHROME), None));
        assert_eq!(metrics.device.device_type, DeviceType::Mobile);
        assert_eq!(metrics.browser, Browser::Chrome);
        assert_eq!(metrics.referrer, "direct");
        assert_eq!(metrics.engagement.level, EngagementLevel::High);
        assert_eq!(metrics.quality_score, 95);
        assert_eq!(metrics.ip, "198.51.100.4");
        assert_eq!(
            metrics.fingerprint,
            create_fingerprint("198.51.100.4", ANDROID_CHROME)
        );
    }

    #[test]
    fn test_missing_headers_default() {
        let metrics = ScanContextBuilder::default().analyze(&request(None, None));
        assert_eq!(metrics.user_agent, "unknown");
        assert_eq!(metrics.device.device_type, DeviceType::Unknown);
        assert_eq!(metrics.browser, Browser::Other);
        assert_eq!(metrics.quality_score, 65);
    }

    #[test]
    fn test_referrer_is_kept() {
        let metrics = ScanContextBuilder::default()
            .analyze(&request(Some(ANDROID_CHROME), Some("https://social.example/post")));
        assert_eq!(metrics.referrer, "https://social.example/post");
        assert_eq!(metrics.quality_score, 80);
    }

    #[test]
    fn test_user_agent_truncated_but_fingerprint_uses_full() {
        let long_ua = format!("Mozilla/5.0 {}", "é".repeat(300));
        let metrics = ScanContextBuilder::default().analyze(&request(Some(&long_ua), None));
        assert_eq!(metrics.user_agent.chars().count(), MAX_USER_AGENT_CHARS);
        assert_eq!(metrics.fingerprint, create_fingerprint("198.51.100.4", &long_ua));
    }

    #[test]
    fn test_normalize_ip() {
        assert_eq!(normalize_ip("::ffff:10.1.2.3"), "10.1.2.3");
        assert_eq!(normalize_ip("2001:db8::1"), "2001:db8::1");
    }
}
