use crate::alert::AlertSink;
use crate::constants::*;
use crate::models::{Coordinates, SeverityLevel, Way};
use crate::viewer::surface::{LayerId, MapEvent, MapEventKind, MapSurface, PathStyle, TileLayer};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasPhase {
    Uninitialized,
    Ready,
}

/// Side effects the canvas asks its owner to apply to sibling components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasEffect {
    HideResults,
}

/// Owns the map surface and keeps the drawn road paths in sync with the
/// current selection.
pub struct MapCanvas<S: MapSurface> {
    surface: S,
    phase: CanvasPhase,
    drawn_paths: Vec<LayerId>,
    alerts: Arc<dyn AlertSink>,
}

impl<S: MapSurface> MapCanvas<S> {
    pub fn new(surface: S, alerts: Arc<dyn AlertSink>) -> Self {
        MapCanvas {
            surface,
            phase: CanvasPhase::Uninitialized,
            drawn_paths: Vec::new(),
            alerts,
        }
    }

    pub fn phase(&self) -> CanvasPhase {
        self.phase
    }

    /// Initialize the map. Only the first call does anything.
    pub fn mount(&mut self) -> bool {
        if self.phase == CanvasPhase::Ready {
            return false;
        }

        let initial = Coordinates {
            lat: INITIAL_VIEW_LAT,
            lon: INITIAL_VIEW_LON,
        };
        self.surface.set_view(initial, INITIAL_VIEW_ZOOM);
        self.surface.add_tile_layer(&TileLayer::openstreetmap());
        self.surface.subscribe(MapEventKind::LocationFound);
        self.surface.subscribe(MapEventKind::LocationError);
        self.surface.subscribe(MapEventKind::Click);
        self.surface.locate(true, LOCATE_MAX_ZOOM);

        self.phase = CanvasPhase::Ready;
        tracing::debug!("Map canvas mounted");
        true
    }

    /// Dispatch a map event. Events before mount are ignored.
    pub fn handle_event(&mut self, event: MapEvent) -> Option<CanvasEffect> {
        if self.phase != CanvasPhase::Ready {
            tracing::debug!("Ignoring {:?} before mount", event.kind());
            return None;
        }

        match event {
            MapEvent::LocationFound {
                position,
                accuracy_m,
            } => {
                tracing::debug!("Location found: {:?} (±{}m)", position, accuracy_m);
                self.surface.add_marker(position);
                self.surface.add_circle(position, accuracy_m);
                None
            }
            MapEvent::LocationError { message } => {
                self.alerts.alert(&message);
                None
            }
            MapEvent::Click => Some(CanvasEffect::HideResults),
        }
    }

    /// Fly to `position` and redraw one path per way, colored by `score`.
    ///
    /// Paths from the previous call are removed first, so an empty road just
    /// clears the map. Nothing happens until the canvas is mounted and a
    /// position has been selected.
    pub fn show_selection(
        &mut self,
        position: Option<Coordinates>,
        road: &[Way],
        score: f64,
    ) -> bool {
        if self.phase != CanvasPhase::Ready {
            return false;
        }
        let Some(position) = position else {
            return false;
        };

        self.surface.fly_to(position, SELECTION_ZOOM);
        self.clear_paths();

        let severity = SeverityLevel::from_score(score);
        for way in road {
            let style = PathStyle {
                color: severity.color(),
                severity,
                score,
                way_id: way.id,
                name: way.name().map(str::to_string),
            };
            let id = self.surface.add_polyline(&way.geometry, &style);
            self.drawn_paths.push(id);
        }

        tracing::debug!(
            "Drew {} road paths as {} at {:?}",
            self.drawn_paths.len(),
            severity,
            position
        );
        true
    }

    pub fn clear_paths(&mut self) {
        for id in self.drawn_paths.drain(..) {
            self.surface.remove_layer(id);
        }
    }

    pub fn drawn_path_count(&self) -> usize {
        self.drawn_paths.len()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
