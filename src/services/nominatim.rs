use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, PlaceCandidate};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Place-search client for a Nominatim-compatible geocoder.
///
/// Every search is restricted to the `highway` category and the configured
/// country filter, so only roads come back as candidates.
#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
    country_codes: String,
}

impl NominatimClient {
    pub fn new() -> Result<Self> {
        Self::with_config(
            DEFAULT_NOMINATIM_BASE_URL.to_string(),
            DEFAULT_COUNTRY_CODES.to_string(),
            DEFAULT_USER_AGENT,
            DEFAULT_HTTP_TIMEOUT_SECONDS,
        )
    }

    pub fn with_config(
        base_url: String,
        country_codes: String,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(NominatimClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            country_codes,
        })
    }

    /// Look up road candidates matching free text
    pub async fn search_places(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        let url = format!("{}/search", self.base_url);

        tracing::debug!(query = %query, countrycodes = %self.country_codes, "Nominatim search");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("polygon_geojson", "0"),
                ("category", GEOCODE_CATEGORY),
                ("countrycodes", self.country_codes.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::GeocodingApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = %status, "Nominatim HTTP error {}: {}", status, error_text);
            return Err(AppError::GeocodingApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| AppError::GeocodingApi(format!("Failed to parse response: {}", e)))?;

        let candidates: Vec<PlaceCandidate> = places
            .into_iter()
            .filter_map(NominatimPlace::into_candidate)
            .collect();

        tracing::info!("Nominatim returned {} candidates for {:?}", candidates.len(), query);

        Ok(candidates)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    place_id: u64,
    #[serde(default)]
    osm_id: Option<i64>,
    // Nominatim encodes coordinates as decimal strings
    lat: Value,
    lon: Value,
    display_name: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: BTreeMap<String, String>,
}

impl NominatimPlace {
    fn into_candidate(self) -> Option<PlaceCandidate> {
        let (Some(lat), Some(lon)) = (parse_coord(&self.lat), parse_coord(&self.lon)) else {
            tracing::warn!(place_id = self.place_id, "Skipping place with unparseable coordinates");
            return None;
        };

        let position = match Coordinates::new(lat, lon) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(place_id = self.place_id, "Skipping place: {}", e);
                return None;
            }
        };

        // `name` is empty for some unnamed segments; fall back to the
        // leading component of the display name
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                self.display_name
                    .split(',')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            });

        Some(PlaceCandidate {
            place_id: self.place_id,
            osm_id: self.osm_id,
            name,
            display_name: self.display_name,
            position,
            address: self.address,
        })
    }
}

fn parse_coord(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
