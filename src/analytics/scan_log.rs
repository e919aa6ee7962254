//! One JSON line per redirect on standard output
//!
//! Diagnostics go through `tracing` to stderr; stdout carries only these
//! lines so they can be shipped as-is to a log collector.

use serde::Serialize;
use std::io::Write;
use tracing::warn;

use crate::analytics::models::SanitizedRecord;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanLogLine<'a> {
    pub event: &'static str,
    #[serde(flatten)]
    pub record: &'a SanitizedRecord,
    pub target_url: &'a str,
    pub message: String,
}

impl<'a> ScanLogLine<'a> {
    pub fn new(record: &'a SanitizedRecord, target_url: &'a str) -> Self {
        let message = format!(
            "Scan /r/{} -> {} (score {}, {} {})",
            record.slug,
            target_url,
            record.quality_score,
            record.device.device_type,
            record.device.os
        );
        Self {
            event: "redirect",
            record,
            target_url,
            message,
        }
    }
}

/// Write the scan line for `record` to stdout
pub fn log_scan(record: &SanitizedRecord, target_url: &str) {
    let line = ScanLogLine::new(record, target_url);
    match serde_json::to_string(&line) {
        Ok(json) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{}", json) {
                warn!(error = %e, "failed to write scan log line");
            }
        }
        Err(e) => warn!(error = %e, "failed to serialize scan log line"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::engagement::classify_hour;
    use crate::analytics::models::{Browser, DeviceInfo, DeviceType, ReferrerType};
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_log_line_shape() {
        let record = SanitizedRecord {
            timestamp: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 6, 1, 15, 0, 0)
                .unwrap(),
            slug: "orbit-games".to_string(),
            device: DeviceInfo::new(DeviceType::Mobile, "Android", "Google"),
            browser: Browser::Chrome,
            engagement: classify_hour(15),
            quality_score: 95,
            fingerprint: "00112233445566ff".to_string(),
            referrer_type: ReferrerType::Direct,
        };

        let line = ScanLogLine::new(&record, "https://games.example");
        let json = serde_json::to_value(line).unwrap();
        assert_eq!(json["event"], "redirect");
        assert_eq!(json["slug"], "orbit-games");
        assert_eq!(json["targetUrl"], "https://games.example");
        assert_eq!(json["qualityScore"], 95);
        assert_eq!(
            json["message"],
            "Scan /r/orbit-games -> https://games.example (score 95, mobile Android)"
        );
        assert!(json.get("ip").is_none());
    }
}
