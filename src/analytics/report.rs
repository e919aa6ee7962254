//! Aggregate reports and exports computed on read

use chrono::Timelike;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;

use crate::analytics::models::SanitizedRecord;
use crate::analytics::store::SummaryView;
use crate::models::RouteTable;

/// Number of records returned in `recentScans`
pub const RECENT_SCANS_LIMIT: usize = 20;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStat {
    pub slug: String,
    pub scans: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdowns {
    /// Keyed by `{device type}_{os}`
    pub devices: BTreeMap<String, u64>,
    pub engagement: BTreeMap<String, u64>,
    /// Keyed by hour of day, 0-23
    pub hourly: BTreeMap<u32, u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub slug: Option<String>,
    pub total_scans: usize,
    pub unique_users: usize,
    pub repeat_scan_rate: String,
    pub avg_quality_score: f64,
    pub breakdowns: Breakdowns,
    pub recent_scans: Vec<SanitizedRecord>,
    pub campaigns: Vec<CampaignStat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryView>,
}

fn repeat_scan_rate(total: usize, unique: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    let rate = (1.0 - unique as f64 / total as f64) * 100.0;
    format!("{:.2}%", rate)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build a report over `records`, filtered by `slug` when given.
///
/// Campaign counts always cover every route in `routes` and every record,
/// regardless of the slug filter.
pub fn build_report(
    records: &[SanitizedRecord],
    slug: Option<&str>,
    routes: &RouteTable,
    summary: Option<SummaryView>,
) -> ReportView {
    let matching: Vec<&SanitizedRecord> = records
        .iter()
        .filter(|r| slug.map_or(true, |s| r.slug == s))
        .collect();

    let total_scans = matching.len();
    let unique_users = matching
        .iter()
        .map(|r| r.fingerprint.as_str())
        .collect::<HashSet<_>>()
        .len();

    let avg_quality_score = if total_scans == 0 {
        0.0
    } else {
        let sum: u64 = matching.iter().map(|r| u64::from(r.quality_score)).sum();
        round2(sum as f64 / total_scans as f64)
    };

    let mut breakdowns = Breakdowns::default();
    for record in &matching {
        *breakdowns
            .devices
            .entry(record.device.breakdown_key())
            .or_insert(0) += 1;
        *breakdowns
            .engagement
            .entry(record.engagement.level.as_str().to_string())
            .or_insert(0) += 1;
        *breakdowns.hourly.entry(record.timestamp.hour()).or_insert(0) += 1;
    }

    let recent_scans = matching
        .iter()
        .rev()
        .take(RECENT_SCANS_LIMIT)
        .map(|r| (*r).clone())
        .collect();

    let mut per_slug: HashMap<&str, u64> = HashMap::new();
    for record in records {
        *per_slug.entry(record.slug.as_str()).or_insert(0) += 1;
    }
    let campaigns = routes
        .iter()
        .map(|route| CampaignStat {
            slug: route.slug.clone(),
            scans: per_slug.get(route.slug.as_str()).copied().unwrap_or(0),
        })
        .collect();

    ReportView {
        slug: slug.map(str::to_string),
        total_scans,
        unique_users,
        repeat_scan_rate: repeat_scan_rate(total_scans, unique_users),
        avg_quality_score,
        breakdowns,
        recent_scans,
        campaigns,
        summary,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unsupported export format '{other}', expected json or csv")),
        }
    }
}

pub const CSV_HEADER: &str =
    "timestamp,slug,device_type,device_os,browser,engagement_level,quality_score,fingerprint";

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Flatten records into CSV with a fixed column order
pub fn to_csv(records: &[SanitizedRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for record in records {
        let row = [
            record.timestamp.to_rfc3339(),
            csv_field(&record.slug),
            record.device.device_type.as_str().to_string(),
            csv_field(&record.device.os),
            record.browser.as_str().to_string(),
            record.engagement.level.as_str().to_string(),
            record.quality_score.to_string(),
            record.fingerprint.clone(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::engagement::classify_hour;
    use crate::analytics::models::{Browser, DeviceInfo, DeviceType, ReferrerType};
    use chrono::{FixedOffset, TimeZone};

    fn record(
        slug: &str,
        fingerprint: &str,
        hour: u32,
        score: u8,
        device: DeviceInfo,
    ) -> SanitizedRecord {
        SanitizedRecord {
            timestamp: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 6, 1, hour, 0, 0)
                .unwrap(),
            slug: slug.to_string(),
            device,
            browser: Browser::Chrome,
            engagement: classify_hour(hour),
            quality_score: score,
            fingerprint: fingerprint.to_string(),
            referrer_type: ReferrerType::Direct,
        }
    }

    fn ios() -> DeviceInfo {
        DeviceInfo::new(DeviceType::Mobile, "iOS", "Apple")
    }

    fn desktop(os: &str, platform: &str) -> DeviceInfo {
        DeviceInfo::new(DeviceType::Desktop, os, platform)
    }

    fn routes() -> RouteTable {
        RouteTable::new([
            ("demo", "https://demo.example"),
            ("promo", "https://promo.example"),
            ("idle", "https://idle.example"),
        ])
    }

    #[test]
    fn test_empty_report() {
        let report = build_report(&[], None, &routes(), None);
        assert_eq!(report.total_scans, 0);
        assert_eq!(report.unique_users, 0);
        assert_eq!(report.repeat_scan_rate, "0%");
        assert_eq!(report.avg_quality_score, 0.0);
        assert!(report.recent_scans.is_empty());
        assert_eq!(report.campaigns.len(), 3);
        assert!(report.campaigns.iter().all(|c| c.scans == 0));
    }

    #[test]
    fn test_filtered_report() {
        let records = vec![
            record("demo", "a", 10, 95, ios()),
            record("promo", "b", 13, 75, desktop("Windows", "Microsoft")),
            record("demo", "a", 10, 90, ios()),
            record("demo", "c", 22, 80, desktop("Linux", "Open")),
        ];

        let report = build_report(&records, Some("demo"), &routes(), None);
        assert_eq!(report.total_scans, 3);
        assert_eq!(report.unique_users, 2);
        assert_eq!(report.repeat_scan_rate, "33.33%");
        assert_eq!(report.avg_quality_score, 88.33);
        assert_eq!(report.breakdowns.devices.get("mobile_iOS"), Some(&2));
        assert_eq!(report.breakdowns.devices.get("desktop_Linux"), Some(&1));
        assert_eq!(report.breakdowns.engagement.get("high"), Some(&2));
        assert_eq!(report.breakdowns.engagement.get("low"), Some(&1));
        assert_eq!(report.breakdowns.hourly.get(&10), Some(&2));
        assert_eq!(report.breakdowns.hourly.get(&22), Some(&1));

        // Most recent first
        assert_eq!(report.recent_scans[0].fingerprint, "c");

        // Campaign counts ignore the slug filter
        let counts: Vec<(String, u64)> = report
            .campaigns
            .iter()
            .map(|c| (c.slug.clone(), c.scans))
            .collect();
        assert_eq!(
            counts,
            vec![("demo".to_string(), 3), ("promo".to_string(), 1), ("idle".to_string(), 0)]
        );
    }

    #[test]
    fn test_recent_scans_capped() {
        let records: Vec<SanitizedRecord> = (0..30)
            .map(|i| record("demo", &format!("fp{i}"), 9, 70, ios()))
            .collect();
        let report = build_report(&records, None, &routes(), None);
        assert_eq!(report.recent_scans.len(), RECENT_SCANS_LIMIT);
        assert_eq!(report.recent_scans[0].fingerprint, "fp29");
        assert_eq!(report.repeat_scan_rate, "0.00%");
    }

    #[test]
    fn test_report_json_shape() {
        let records = vec![record("demo", "a", 10, 95, ios())];
        let report = build_report(&records, Some("demo"), &routes(), None);
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["totalScans"], 1);
        assert_eq!(json["repeatScanRate"], "0.00%");
        assert_eq!(json["breakdowns"]["hourly"]["10"], 1);
        assert!(json.get("summary").is_none());
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_csv_columns() {
        let records = vec![record("demo", "0123456789abcdef", 10, 95, ios())];
        let csv = to_csv(&records);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(
            lines.next(),
            Some("2024-06-01T10:00:00+00:00,demo,mobile,iOS,Chrome,high,95,0123456789abcdef")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
