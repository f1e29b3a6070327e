use crate::alert::LogAlertSink;
use crate::error::{AppError, Result};
use crate::models::coordinates::path_length_km;
use crate::models::{Coordinates, SeverityLevel};
use crate::viewer::{GeoJsonSurface, MapCanvas};
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Query parameters for a road overlay
#[derive(Debug, Deserialize)]
pub struct RoadQueryParams {
    /// Exact road name, as returned in a search candidate
    #[serde(default)]
    pub name: String,
    /// Externally supplied flood severity score
    #[serde(default)]
    pub score: f64,
    /// Selected position; defaults to the first point of the first way
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl RoadQueryParams {
    pub fn validate(&self) -> Result<Option<Coordinates>> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "name must not be empty".to_string(),
            ));
        }
        if !self.score.is_finite() {
            return Err(AppError::InvalidRequest(
                "score must be a finite number".to_string(),
            ));
        }

        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon)
                .map(Some)
                .map_err(AppError::InvalidRequest),
            (None, None) => Ok(None),
            _ => Err(AppError::InvalidRequest(
                "lat and lon must be given together".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoadOverlayResponse {
    pub name: String,
    pub score: f64,
    pub severity: SeverityLevel,
    pub color: &'static str,
    pub way_count: usize,
    pub total_length_km: f64,
    pub center: Option<Coordinates>,
    pub zoom: Option<u8>,
    pub fetched_at: String,
    pub overlay: FeatureCollection,
}

/// GET /roads - Ways matching a road name, colored by severity, as GeoJSON
pub async fn road_overlay(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RoadQueryParams>,
) -> Result<Json<RoadOverlayResponse>> {
    let requested_position = params.validate()?;
    let name = params.name.trim();

    let ways = state.geometry.ways_named(name).await?;

    let position = requested_position.or_else(|| {
        ways.iter()
            .find_map(|w| w.geometry.first().copied())
    });

    let mut canvas = MapCanvas::new(GeoJsonSurface::new(), Arc::new(LogAlertSink));
    canvas.mount();
    let drawn = canvas.show_selection(position, &ways, params.score);
    let surface = canvas.into_surface();

    let severity = SeverityLevel::from_score(params.score);
    let total_length_km = ways.iter().map(|w| path_length_km(&w.geometry)).sum();

    tracing::info!(
        "Road overlay {:?}: {} ways, severity {}",
        name,
        ways.len(),
        severity
    );

    let fetched_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| AppError::Internal(format!("Failed to format timestamp: {}", e)))?;

    Ok(Json(RoadOverlayResponse {
        name: name.to_string(),
        score: params.score,
        severity,
        color: severity.color(),
        way_count: ways.len(),
        total_length_km,
        center: if drawn { surface.center() } else { position },
        zoom: drawn.then(|| surface.zoom()).flatten(),
        fetched_at,
        overlay: surface.paths_feature_collection(),
    }))
}
