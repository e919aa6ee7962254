use std::sync::Arc;

use crate::analytics::{
    AnalyticsStore, GeoResolver, ScanContextBuilder, UaClassifier, UnknownGeoResolver,
};
use crate::config::AnalyticsConfig;
use crate::models::RouteTable;

/// Shared state injected into every handler
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub store: Arc<AnalyticsStore>,
    pub scanner: ScanContextBuilder,
    pub geo: Arc<dyn GeoResolver>,
    pub analytics: AnalyticsConfig,
}

impl AppState {
    /// State with a fresh, empty store and the stub geo resolver
    pub fn new(routes: RouteTable, analytics: AnalyticsConfig) -> Self {
        Self::with_store(routes, analytics, Arc::new(AnalyticsStore::new()))
    }

    pub fn with_store(
        routes: RouteTable,
        analytics: AnalyticsConfig,
        store: Arc<AnalyticsStore>,
    ) -> Self {
        let scanner = ScanContextBuilder::new(UaClassifier::new(analytics.device_policy));
        Self {
            routes: Arc::new(routes),
            store,
            scanner,
            geo: Arc::new(UnknownGeoResolver),
            analytics,
        }
    }

    pub fn with_geo_resolver(mut self, geo: Arc<dyn GeoResolver>) -> Self {
        self.geo = geo;
        self
    }
}
