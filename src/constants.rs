//! Stable application-wide constants.
//!
//! Values here are fixed product behavior (map view, tile source, severity
//! thresholds) and default fallbacks for env-var-based configuration.
//! Anything deployment-specific lives in [`Config`](crate::config::Config).

use reqwest::StatusCode;

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- External services ---

/// Nominatim place-search base URL. Overridden by `NOMINATIM_BASE_URL`.
pub const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
/// Overpass interpreter endpoints, tried round-robin. Overridden by `OVERPASS_ENDPOINTS`.
pub const DEFAULT_OVERPASS_ENDPOINTS: &[&str] = &[
    "https://overpass-api.de/api/interpreter",
    "https://overpass.private.coffee/api/interpreter",
];
/// Country filter for geocoding. Overridden by `COUNTRY_CODES`.
pub const DEFAULT_COUNTRY_CODES: &str = "ph";
/// Nominatim rejects requests without an identifying User-Agent.
pub const DEFAULT_USER_AGENT: &str = concat!("floodmap/", env!("CARGO_PKG_VERSION"));
/// Only road-like places are offered as search candidates.
pub const GEOCODE_CATEGORY: &str = "highway";

/// Server-side timeout embedded in every Overpass query.
pub const OVERPASS_QUERY_TIMEOUT_SECONDS: u64 = 25;
/// Retries after the first Overpass attempt (2 = 3 total attempts).
pub const OVERPASS_RETRY_MAX_ATTEMPTS: usize = 2;
/// Base delay for exponential backoff between Overpass retries.
pub const OVERPASS_RETRY_BACKOFF_BASE_MS: u64 = 1000;
pub const OVERPASS_HTTP_TOO_MANY_REQUESTS: StatusCode = StatusCode::TOO_MANY_REQUESTS;
pub const OVERPASS_HTTP_GATEWAY_TIMEOUT: StatusCode = StatusCode::GATEWAY_TIMEOUT;

/// Default per-request timeout for geocoding calls.
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

// --- Road cache defaults ---

/// Way lists change rarely; one hour keeps Overpass load down. Overridden by `ROAD_CACHE_TTL`.
pub const DEFAULT_ROAD_CACHE_TTL_SECONDS: u64 = 3_600;
/// Maximum entries for the in-memory road cache.
pub const DEFAULT_MEMORY_CACHE_MAX_ENTRIES: u64 = 1_000;

// --- Map view ---

/// Initial map center (roughly the middle of the Philippine archipelago).
pub const INITIAL_VIEW_LAT: f64 = 12.87;
pub const INITIAL_VIEW_LON: f64 = 121.77;
pub const INITIAL_VIEW_ZOOM: u8 = 6;
/// Zoom used when flying to a selected road.
pub const SELECTION_ZOOM: u8 = 16;
/// Upper zoom bound for the one-time locate-and-recenter on mount.
pub const LOCATE_MAX_ZOOM: u8 = 20;

pub const TILE_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_MAX_ZOOM: u8 = 19;
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap";

// --- Geolocation ---

/// Position reported before the first fix arrives (Quezon City).
pub const FALLBACK_LAT: f64 = 14.6;
pub const FALLBACK_LON: f64 = 121.07;

// --- Severity buckets (inclusive lower bounds) ---

pub const SEVERE_THRESHOLD: f64 = 0.7;
pub const MODERATE_THRESHOLD: f64 = 0.4;

// --- Preferences ---

/// Preference key holding the most recent road searches.
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";
pub const MAX_RECENT_SEARCHES: usize = 10;
