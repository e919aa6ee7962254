//! In-memory analytics store
//!
//! An append-only log of sanitized scan records plus a per-slug summary.
//! Both live for the lifetime of the process and are never pruned.
//!
//! The log and the summaries are updated under the same write lock so a
//! concurrent reader never observes a record without its counter update.

use chrono::{DateTime, FixedOffset};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::debug;

use crate::analytics::models::SanitizedRecord;

/// Running counters for one slug
#[derive(Debug, Clone)]
pub struct SlugSummary {
    pub total_scans: u64,
    pub unique_users: HashSet<String>,
    pub first_scan: DateTime<FixedOffset>,
    pub last_scan: DateTime<FixedOffset>,
}

impl SlugSummary {
    fn new(record: &SanitizedRecord) -> Self {
        Self {
            total_scans: 0,
            unique_users: HashSet::new(),
            first_scan: record.timestamp,
            last_scan: record.timestamp,
        }
    }

    fn update(&mut self, record: &SanitizedRecord) {
        self.total_scans += 1;
        self.unique_users.insert(record.fingerprint.clone());
        self.last_scan = record.timestamp;
    }

    pub fn view(&self) -> SummaryView {
        SummaryView {
            total_scans: self.total_scans,
            unique_users: self.unique_users.len(),
            first_scan: self.first_scan,
            last_scan: self.last_scan,
        }
    }
}

/// Serializable snapshot of a [`SlugSummary`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub total_scans: u64,
    pub unique_users: usize,
    pub first_scan: DateTime<FixedOffset>,
    pub last_scan: DateTime<FixedOffset>,
}

#[derive(Default)]
pub struct AnalyticsStore {
    /// Records in arrival order
    records: RwLock<Vec<SanitizedRecord>>,
    summaries: DashMap<String, SlugSummary>,
}

impl AnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and update its slug summary
    pub async fn append(&self, record: SanitizedRecord) {
        let mut records = self.records.write().await;

        self.summaries
            .entry(record.slug.clone())
            .or_insert_with(|| SlugSummary::new(&record))
            .update(&record);

        debug!(slug = %record.slug, total = records.len() + 1, "appended scan record");
        records.push(record);
    }

    /// Snapshot of all records, optionally restricted to one slug
    pub async fn records(&self, slug: Option<&str>) -> Vec<SanitizedRecord> {
        let records = self.records.read().await;
        match slug {
            Some(slug) => records.iter().filter(|r| r.slug == slug).cloned().collect(),
            None => records.clone(),
        }
    }

    /// Ascending scan timestamps for one slug
    pub async fn timestamps(&self, slug: &str) -> Vec<DateTime<FixedOffset>> {
        let records = self.records.read().await;
        records
            .iter()
            .filter(|r| r.slug == slug)
            .map(|r| r.timestamp)
            .collect()
    }

    /// All records plus the summary for `slug`, read under one guard so
    /// the summary counts exactly the records returned
    pub async fn snapshot(
        &self,
        slug: Option<&str>,
    ) -> (Vec<SanitizedRecord>, Option<SummaryView>) {
        let records = self.records.read().await;
        let summary = slug.and_then(|s| self.summary(s));
        (records.clone(), summary)
    }

    pub fn summary(&self, slug: &str) -> Option<SummaryView> {
        self.summaries.get(slug).map(|entry| entry.view())
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
