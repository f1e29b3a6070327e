use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A geocoding hit offered to the user as a road to inspect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceCandidate {
    pub place_id: u64,
    pub osm_id: Option<i64>,
    /// Short name, used to look up the road geometry.
    pub name: String,
    /// Full human-readable address line.
    pub display_name: String,
    pub position: Coordinates,
    #[serde(default)]
    pub address: BTreeMap<String, String>,
}

impl PlaceCandidate {
    /// Best-effort locality for display ("Quezon City", "Makati", ...).
    pub fn locality(&self) -> Option<&str> {
        ["city", "town", "municipality", "suburb"]
            .iter()
            .find_map(|k| self.address.get(*k))
            .map(String::as_str)
    }
}
