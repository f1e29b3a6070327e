pub mod nominatim;
pub mod overpass;

use crate::cache::{road_cache_key, RoadCache};
use crate::error::Result;
use crate::models::{PlaceCandidate, Way};
use async_trait::async_trait;
use std::sync::Arc;

pub use nominatim::NominatimClient;
pub use overpass::OverpassClient;

/// Turns free text into candidate places.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>>;
}

/// Fetches the way geometry for a road name.
#[async_trait]
pub trait GeometrySource: Send + Sync {
    async fn ways_named(&self, name: &str) -> Result<Vec<Way>>;
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        self.search_places(query).await
    }
}

#[async_trait]
impl GeometrySource for OverpassClient {
    async fn ways_named(&self, name: &str) -> Result<Vec<Way>> {
        self.query_ways_by_name(name).await
    }
}

/// Read-through road cache in front of another geometry source.
/// Errors are never cached.
pub struct CachedGeometrySource {
    inner: Arc<dyn GeometrySource>,
    cache: Arc<dyn RoadCache>,
}

impl CachedGeometrySource {
    pub fn new(inner: Arc<dyn GeometrySource>, cache: Arc<dyn RoadCache>) -> Self {
        CachedGeometrySource { inner, cache }
    }
}

#[async_trait]
impl GeometrySource for CachedGeometrySource {
    async fn ways_named(&self, name: &str) -> Result<Vec<Way>> {
        let key = road_cache_key(name);

        if let Some(ways) = self.cache.lookup(&key).await {
            return Ok(ways);
        }

        let ways = self.inner.ways_named(name).await?;
        self.cache.store(&key, &ways).await;
        Ok(ways)
    }
}
