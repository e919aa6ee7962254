//! Geographic inference for client IPs
//!
//! No geolocation database is bundled. The default resolver answers
//! "Unknown" for every field so the redirect path never waits on it.

use async_trait::async_trait;

use crate::analytics::models::GeoLocation;

#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// Resolve a client IP. Implementations must fail open and return
    /// [`GeoLocation::default`] instead of an error.
    async fn infer(&self, ip: &str) -> GeoLocation;
}

/// Resolver that knows nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownGeoResolver;

#[async_trait]
impl GeoResolver for UnknownGeoResolver {
    async fn infer(&self, _ip: &str) -> GeoLocation {
        GeoLocation::default()
    }
}
