use axum::Router;
use floodmap::cache::{MemoryCacheService, RedisCacheService, RoadCache};
use floodmap::config::Config;
use floodmap::constants::{
    DEFAULT_MEMORY_CACHE_MAX_ENTRIES, OVERPASS_RETRY_BACKOFF_BASE_MS, OVERPASS_RETRY_MAX_ATTEMPTS,
    RECENT_SEARCHES_KEY,
};
use floodmap::preferences::{JsonFileStore, MemoryStore, PreferenceCell, PreferenceStore};
use floodmap::services::{
    CachedGeometrySource, GeometrySource, NominatimClient, OverpassClient,
};
use floodmap::AppState;
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floodmap=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting floodmap API server");
    tracing::info!(
        "Geocoding via {} (countrycodes={}), {} Overpass endpoints",
        config.nominatim_base_url,
        config.country_codes,
        config.overpass_endpoints.len()
    );

    // Initialize cache: try Redis, fall back to in-memory
    let cache: Arc<dyn RoadCache> = if let Some(ref redis_url) = config.redis_url {
        tracing::info!("Connecting to Redis cache...");
        match RedisCacheService::new(redis_url, config.road_cache_ttl).await {
            Ok(redis_cache) => Arc::new(redis_cache),
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Falling back to in-memory cache.",
                    e
                );
                Arc::new(MemoryCacheService::new(
                    config.road_cache_ttl,
                    DEFAULT_MEMORY_CACHE_MAX_ENTRIES,
                ))
            }
        }
    } else {
        tracing::info!("Redis URL not configured. Using in-memory cache.");
        Arc::new(MemoryCacheService::new(
            config.road_cache_ttl,
            DEFAULT_MEMORY_CACHE_MAX_ENTRIES,
        ))
    };

    // Preferences: JSON file when configured, otherwise process memory
    let store: Arc<dyn PreferenceStore> = match config.preferences_path {
        Some(ref path) => {
            tracing::info!("Preferences stored in {}", path.display());
            Arc::new(JsonFileStore::open(path)?)
        }
        None => Arc::new(MemoryStore::new()),
    };

    // Initialize services
    let geocoder = NominatimClient::with_config(
        config.nominatim_base_url.clone(),
        config.country_codes.clone(),
        &config.user_agent,
        config.http_timeout_secs,
    )?;
    let overpass: Arc<dyn GeometrySource> = Arc::new(OverpassClient::with_config(
        config.overpass_endpoints.clone(),
        OVERPASS_RETRY_MAX_ATTEMPTS,
        OVERPASS_RETRY_BACKOFF_BASE_MS,
    )?);
    let geometry = CachedGeometrySource::new(overpass, cache.clone());

    // Create application state
    let state = Arc::new(AppState {
        geocoder: Arc::new(geocoder),
        geometry: Arc::new(geometry),
        cache: Some(cache),
        recent_searches: Mutex::new(PreferenceCell::load(store, RECENT_SEARCHES_KEY, Vec::new())),
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", floodmap::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
