pub mod debug;
pub mod map;
pub mod roads;
pub mod search;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(search::search_places))
        .route("/search/recent", get(search::recent_searches))
        .route("/roads", get(roads::road_overlay))
        .route("/legend", get(map::legend))
        .route("/map/config", get(map::map_config))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
