use crate::models::coordinates::{path_length_km, Coordinates};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// OSM element type tag of a retained road segment.
pub const WAY_TYPE: &str = "way";

/// A named line-shaped map feature with its full geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Way {
    pub id: i64,
    #[serde(rename = "type")]
    pub element_type: String,
    pub geometry: Vec<Coordinates>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl Way {
    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str)
    }

    /// OSM `highway=*` class, e.g. "primary" or "trunk".
    pub fn highway(&self) -> Option<&str> {
        self.tags.get("highway").map(String::as_str)
    }

    pub fn length_km(&self) -> f64 {
        path_length_km(&self.geometry)
    }
}

/// Raw element from an Overpass `out geom` response.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    #[serde(default)]
    pub geometry: Option<Vec<GeometryPoint>>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeometryPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// Keep only `"way"` elements, in response order.
///
/// Points outside the valid coordinate range are dropped rather than failing
/// the whole way; a way left without geometry is still retained.
pub fn filter_ways(elements: Vec<OverpassElement>) -> Vec<Way> {
    elements
        .into_iter()
        .filter(|e| e.element_type == WAY_TYPE)
        .map(|e| Way {
            id: e.id,
            geometry: e
                .geometry
                .unwrap_or_default()
                .into_iter()
                .filter_map(|p| Coordinates::new(p.lat, p.lon).ok())
                .collect(),
            element_type: e.element_type,
            tags: e.tags,
        })
        .collect()
}
