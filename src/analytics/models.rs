//! Data models for scan analytics

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse device class derived from the user-agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
            DeviceType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device information parsed from a user-agent string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(rename = "type")]
    pub device_type: DeviceType,

    /// Operating system family (e.g., "iOS", "Windows")
    pub os: String,

    /// Vendor platform (e.g., "Apple", "Google")
    pub platform: String,
}

impl DeviceInfo {
    pub fn new(device_type: DeviceType, os: &str, platform: &str) -> Self {
        Self {
            device_type,
            os: os.to_string(),
            platform: platform.to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(DeviceType::Unknown, "unknown", "unknown")
    }

    /// Grouping key used by the device breakdown, e.g. `mobile_iOS`
    pub fn breakdown_key(&self) -> String {
        format!("{}_{}", self.device_type, self.os)
    }
}

/// Browser family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Browser {
    Edge,
    Chrome,
    Safari,
    Firefox,
    Opera,
    Other,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Edge => "Edge",
            Browser::Chrome => "Chrome",
            Browser::Safari => "Safari",
            Browser::Firefox => "Firefox",
            Browser::Opera => "Opera",
            Browser::Other => "Other",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementLevel {
    High,
    Medium,
    Low,
}

impl EngagementLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementLevel::High => "high",
            EngagementLevel::Medium => "medium",
            EngagementLevel::Low => "low",
        }
    }
}

/// Time-of-day engagement tier with its human-readable reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub level: EngagementLevel,
    pub reason: String,
}

/// Metrics derived from a single scan request
///
/// Built once per scan by the scan context builder and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanMetrics {
    pub device: DeviceInfo,
    pub browser: Browser,

    /// `"direct"` when the request carried no referrer, otherwise the raw header
    pub referrer: String,

    /// 16 lowercase hex characters
    pub fingerprint: String,

    pub engagement: Engagement,
    pub quality_score: u8,

    /// Client IP, kept only until sanitization
    pub ip: String,

    /// User-agent truncated to 200 characters
    pub user_agent: String,
}

/// A scan event before sanitization
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    #[serde(flatten)]
    pub metrics: ScanMetrics,

    pub timestamp: DateTime<FixedOffset>,
    pub slug: String,
    pub target_url: String,

    /// Handler latency in milliseconds
    pub latency: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferrerType {
    Direct,
    Referral,
}

/// The only form of a scan that enters the analytics store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub slug: String,
    pub device: DeviceInfo,
    pub browser: Browser,
    pub engagement: Engagement,
    pub quality_score: u8,
    pub fingerprint: String,
    pub referrer_type: ReferrerType,
}

/// Coarse geographic location for a client IP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub country: String,
    pub region: String,
    pub city: String,
    pub timezone: String,
}

impl Default for GeoLocation {
    fn default() -> Self {
        Self {
            country: "Unknown".to_string(),
            region: "Unknown".to_string(),
            city: "Unknown".to_string(),
            timezone: "Unknown".to_string(),
        }
    }
}
