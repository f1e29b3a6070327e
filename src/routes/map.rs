use crate::constants::*;
use crate::geolocation::fallback_position;
use crate::models::{legend as severity_legend, Coordinates, LegendEntry};
use crate::viewer::TileLayer;
use axum::Json;
use serde::Serialize;

/// GET /legend - Severity colors, most severe first
pub async fn legend() -> Json<Vec<LegendEntry>> {
    Json(severity_legend())
}

#[derive(Debug, Serialize)]
pub struct MapConfigResponse {
    pub center: Coordinates,
    pub zoom: u8,
    pub selection_zoom: u8,
    pub locate_max_zoom: u8,
    pub tiles: TileLayer,
    pub fallback_position: Coordinates,
}

/// GET /map/config - Initial view and tile source for map clients
pub async fn map_config() -> Json<MapConfigResponse> {
    Json(MapConfigResponse {
        center: Coordinates {
            lat: INITIAL_VIEW_LAT,
            lon: INITIAL_VIEW_LON,
        },
        zoom: INITIAL_VIEW_ZOOM,
        selection_zoom: SELECTION_ZOOM,
        locate_max_zoom: LOCATE_MAX_ZOOM,
        tiles: TileLayer::openstreetmap(),
        fallback_position: fallback_position(),
    })
}
