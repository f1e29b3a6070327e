//! Map-library seam and its GeoJSON-recording implementation.

use crate::constants::{TILE_ATTRIBUTION, TILE_MAX_ZOOM, TILE_URL_TEMPLATE};
use crate::models::{Coordinates, SeverityLevel};
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

pub type LayerId = u64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub url_template: String,
    pub max_zoom: u8,
    pub attribution: String,
}

impl TileLayer {
    pub fn openstreetmap() -> Self {
        TileLayer {
            url_template: TILE_URL_TEMPLATE.to_string(),
            max_zoom: TILE_MAX_ZOOM,
            attribution: TILE_ATTRIBUTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEventKind {
    LocationFound,
    LocationError,
    Click,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    LocationFound {
        position: Coordinates,
        accuracy_m: f64,
    },
    LocationError {
        message: String,
    },
    /// Click on the map background.
    Click,
}

impl MapEvent {
    pub fn kind(&self) -> MapEventKind {
        match self {
            MapEvent::LocationFound { .. } => MapEventKind::LocationFound,
            MapEvent::LocationError { .. } => MapEventKind::LocationError,
            MapEvent::Click => MapEventKind::Click,
        }
    }
}

/// How one road path is drawn, plus what it represents.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStyle {
    pub color: &'static str,
    pub severity: SeverityLevel,
    pub score: f64,
    pub way_id: i64,
    pub name: Option<String>,
}

/// The operations the viewer needs from a map-rendering library.
pub trait MapSurface {
    fn set_view(&mut self, center: Coordinates, zoom: u8);
    fn add_tile_layer(&mut self, tiles: &TileLayer);
    fn subscribe(&mut self, kind: MapEventKind);
    /// One-time locate request; with `set_view` the map recenters on the fix.
    fn locate(&mut self, set_view: bool, max_zoom: u8);
    /// Animated pan/zoom.
    fn fly_to(&mut self, center: Coordinates, zoom: u8);
    fn add_marker(&mut self, at: Coordinates) -> LayerId;
    fn add_circle(&mut self, center: Coordinates, radius_m: f64) -> LayerId;
    fn add_polyline(&mut self, path: &[Coordinates], style: &PathStyle) -> LayerId;
    fn remove_layer(&mut self, id: LayerId);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Marker(Coordinates),
    Circle {
        center: Coordinates,
        radius_m: f64,
    },
    Polyline {
        path: Vec<Coordinates>,
        style: PathStyle,
    },
}

/// Records drawing calls and exports the drawn layers as GeoJSON, for web
/// clients that do their own rendering.
#[derive(Debug, Default)]
pub struct GeoJsonSurface {
    next_id: LayerId,
    layers: BTreeMap<LayerId, Layer>,
    center: Option<Coordinates>,
    zoom: Option<u8>,
    tiles: Option<TileLayer>,
    subscriptions: Vec<MapEventKind>,
    locate_requests: usize,
}

impl GeoJsonSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn center(&self) -> Option<Coordinates> {
        self.center
    }

    pub fn zoom(&self) -> Option<u8> {
        self.zoom
    }

    pub fn tiles(&self) -> Option<&TileLayer> {
        self.tiles.as_ref()
    }

    pub fn subscriptions(&self) -> &[MapEventKind] {
        &self.subscriptions
    }

    pub fn locate_requests(&self) -> usize {
        self.locate_requests
    }

    pub fn layers(&self) -> impl Iterator<Item = (&LayerId, &Layer)> {
        self.layers.iter()
    }

    pub fn polylines(&self) -> impl Iterator<Item = (&[Coordinates], &PathStyle)> {
        self.layers.values().filter_map(|layer| match layer {
            Layer::Polyline { path, style } => Some((path.as_slice(), style)),
            _ => None,
        })
    }

    /// Road paths only, one `LineString` feature each.
    pub fn paths_feature_collection(&self) -> FeatureCollection {
        let features = self
            .polylines()
            .filter_map(|(path, style)| {
                if path.len() < 2 {
                    tracing::debug!(way_id = style.way_id, "Skipping degenerate path");
                    return None;
                }
                Some(polyline_feature(path, style))
            })
            .collect();

        feature_collection(features)
    }

    /// Every drawn layer: paths, markers and accuracy circles.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .layers
            .values()
            .filter_map(|layer| match layer {
                Layer::Polyline { path, style } if path.len() >= 2 => {
                    Some(polyline_feature(path, style))
                }
                Layer::Polyline { .. } => None,
                Layer::Marker(at) => Some(point_feature(at, json!({"kind": "marker"}))),
                Layer::Circle { center, radius_m } => Some(point_feature(
                    center,
                    json!({"kind": "accuracy", "radius_m": radius_m}),
                )),
            })
            .collect();

        feature_collection(features)
    }

    fn insert(&mut self, layer: Layer) -> LayerId {
        let id = self.next_id;
        self.next_id += 1;
        self.layers.insert(id, layer);
        id
    }
}

impl MapSurface for GeoJsonSurface {
    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        self.center = Some(center);
        self.zoom = Some(zoom);
    }

    fn add_tile_layer(&mut self, tiles: &TileLayer) {
        self.tiles = Some(tiles.clone());
    }

    fn subscribe(&mut self, kind: MapEventKind) {
        if !self.subscriptions.contains(&kind) {
            self.subscriptions.push(kind);
        }
    }

    fn locate(&mut self, _set_view: bool, _max_zoom: u8) {
        self.locate_requests += 1;
    }

    fn fly_to(&mut self, center: Coordinates, zoom: u8) {
        self.set_view(center, zoom);
    }

    fn add_marker(&mut self, at: Coordinates) -> LayerId {
        self.insert(Layer::Marker(at))
    }

    fn add_circle(&mut self, center: Coordinates, radius_m: f64) -> LayerId {
        self.insert(Layer::Circle { center, radius_m })
    }

    fn add_polyline(&mut self, path: &[Coordinates], style: &PathStyle) -> LayerId {
        self.insert(Layer::Polyline {
            path: path.to_vec(),
            style: style.clone(),
        })
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.layers.remove(&id);
    }
}

fn feature_collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn polyline_feature(path: &[Coordinates], style: &PathStyle) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("way_id".to_string(), json!(style.way_id));
    properties.insert("name".to_string(), json!(style.name));
    properties.insert("severity".to_string(), json!(style.severity));
    properties.insert("color".to_string(), json!(style.color));
    properties.insert("score".to_string(), json!(style.score));
    properties.insert(
        "length_km".to_string(),
        json!(crate::models::coordinates::path_length_km(path)),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(
            path.iter().map(Coordinates::to_position).collect(),
        ))),
        id: Some(Id::Number(style.way_id.into())),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn point_feature(at: &Coordinates, properties: serde_json::Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(at.to_position()))),
        id: None,
        properties: properties.as_object().cloned(),
        foreign_members: None,
    }
}
