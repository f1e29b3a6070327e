//! Flood-risk road viewer: place search, road geometry and severity overlays.

pub mod alert;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod geolocation;
pub mod models;
pub mod preferences;
pub mod routes;
pub mod services;
pub mod viewer;

pub use error::{AppError, Result};

use cache::RoadCache;
use preferences::PreferenceCell;
use services::{Geocoder, GeometrySource};
use std::sync::{Arc, Mutex};

/// Shared by every HTTP handler.
pub struct AppState {
    pub geocoder: Arc<dyn Geocoder>,
    pub geometry: Arc<dyn GeometrySource>,
    pub cache: Option<Arc<dyn RoadCache>>,
    pub recent_searches: Mutex<PreferenceCell<Vec<String>>>,
}
