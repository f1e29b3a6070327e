use async_trait::async_trait;
use floodmap::cache::{MemoryCacheService, RoadCache};
use floodmap::constants::RECENT_SEARCHES_KEY;
use floodmap::error::{AppError, Result};
use floodmap::models::{Coordinates, PlaceCandidate, Way};
use floodmap::preferences::{MemoryStore, PreferenceCell, PreferenceStore};
use floodmap::services::{CachedGeometrySource, Geocoder, GeometrySource};
use floodmap::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Create a test place candidate
#[allow(dead_code)]
pub fn create_test_place(id: u64, name: &str, lat: f64, lon: f64) -> PlaceCandidate {
    PlaceCandidate {
        place_id: id,
        osm_id: Some(id as i64 * 10),
        name: name.to_string(),
        display_name: format!("{}, Quezon City, Metro Manila, Philippines", name),
        position: Coordinates::new(lat, lon).unwrap(),
        address: [("city".to_string(), "Quezon City".to_string())]
            .into_iter()
            .collect(),
    }
}

/// Create a test way with a short two-point path starting at (lat, lon)
#[allow(dead_code)]
pub fn create_test_way(id: i64, name: &str, lat: f64, lon: f64) -> Way {
    Way {
        id,
        element_type: "way".to_string(),
        geometry: vec![
            Coordinates::new(lat, lon).unwrap(),
            Coordinates::new(lat + 0.001, lon + 0.001).unwrap(),
        ],
        tags: [
            ("name".to_string(), name.to_string()),
            ("highway".to_string(), "primary".to_string()),
        ]
        .into_iter()
        .collect(),
    }
}

/// Geocoder returning canned candidates per query
#[derive(Default)]
pub struct StubGeocoder {
    pub results: HashMap<String, Vec<PlaceCandidate>>,
    pub fail: bool,
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        if self.fail {
            return Err(AppError::GeocodingApi("HTTP 503".to_string()));
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

/// Geometry source returning canned ways per road name, counting calls
#[derive(Default)]
pub struct StubGeometry {
    pub ways: HashMap<String, Vec<Way>>,
    pub calls: AtomicUsize,
    pub fail: bool,
}

#[allow(dead_code)]
impl StubGeometry {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeometrySource for StubGeometry {
    async fn ways_named(&self, name: &str) -> Result<Vec<Way>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::OverpassApi("HTTP 504: Gateway Timeout".to_string()));
        }
        Ok(self.ways.get(name).cloned().unwrap_or_default())
    }
}

/// Stubs with three places: EDSA (two ways), Katipunan Avenue (one way) and
/// Ghost Road (geocodes, but has no ways)
#[allow(dead_code)]
pub fn sample_services() -> (StubGeocoder, StubGeometry) {
    let mut geocoder = StubGeocoder::default();
    geocoder.results.insert(
        "EDSA".to_string(),
        vec![create_test_place(1, "EDSA", 14.5866, 121.0566)],
    );
    geocoder.results.insert(
        "Katipunan".to_string(),
        vec![create_test_place(2, "Katipunan Avenue", 14.6395, 121.0742)],
    );
    geocoder.results.insert(
        "Ghost".to_string(),
        vec![create_test_place(3, "Ghost Road", 14.7, 121.1)],
    );

    let mut geometry = StubGeometry::default();
    geometry.ways.insert(
        "EDSA".to_string(),
        vec![
            create_test_way(100, "EDSA", 14.58, 121.05),
            create_test_way(101, "EDSA", 14.59, 121.06),
        ],
    );
    geometry.ways.insert(
        "Katipunan Avenue".to_string(),
        vec![create_test_way(200, "Katipunan Avenue", 14.63, 121.07)],
    );

    (geocoder, geometry)
}

/// Build app state around the given stubs, with an in-memory cache
#[allow(dead_code)]
pub fn create_test_state(geocoder: StubGeocoder, geometry: Arc<StubGeometry>) -> Arc<AppState> {
    create_test_state_with_store(geocoder, geometry, Arc::new(MemoryStore::new()))
}

/// Same as [`create_test_state`], with recent searches kept in `store`
#[allow(dead_code)]
pub fn create_test_state_with_store(
    geocoder: StubGeocoder,
    geometry: Arc<StubGeometry>,
    store: Arc<dyn PreferenceStore>,
) -> Arc<AppState> {
    let cache: Arc<dyn RoadCache> = Arc::new(MemoryCacheService::new(3600, 100));

    Arc::new(AppState {
        geocoder: Arc::new(geocoder),
        geometry: Arc::new(CachedGeometrySource::new(geometry, cache.clone())),
        cache: Some(cache),
        recent_searches: Mutex::new(PreferenceCell::load(store, RECENT_SEARCHES_KEY, Vec::new())),
    })
}
