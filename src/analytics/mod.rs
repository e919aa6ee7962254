//! Scan analytics
//!
//! Every redirect flows through the pipeline
//! context → sanitize → store; reports and session analysis are computed
//! from the store on read.

pub mod classifier;
pub mod context;
pub mod engagement;
pub mod fingerprint;
pub mod geoip;
pub mod ip_extractor;
pub mod models;
pub mod report;
pub mod sanitize;
pub mod scan_log;
pub mod scoring;
pub mod session;
pub mod store;

pub use classifier::{DevicePolicy, UaClassifier};
pub use context::{ScanContextBuilder, ScanRequest};
pub use geoip::{GeoResolver, UnknownGeoResolver};
pub use ip_extractor::extract_client_ip;
pub use models::{
    AnalyticsEvent, Browser, DeviceInfo, DeviceType, Engagement, EngagementLevel, GeoLocation,
    ReferrerType, SanitizedRecord, ScanMetrics,
};
pub use report::{build_report, to_csv, ExportFormat, ReportView};
pub use sanitize::sanitize_for_storage;
pub use session::{calculate_velocity, detect_session_windows, SessionWindow};
pub use store::AnalyticsStore;
