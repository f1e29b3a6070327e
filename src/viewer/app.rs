use crate::alert::AlertSink;
use crate::constants::{MAX_RECENT_SEARCHES, RECENT_SEARCHES_KEY};
use crate::models::{legend, Coordinates, LegendEntry, Way};
use crate::preferences::{PreferenceCell, PreferenceStore};
use crate::services::{Geocoder, GeometrySource};
use crate::viewer::map_canvas::{CanvasEffect, MapCanvas};
use crate::viewer::search::SearchPanel;
use crate::viewer::surface::{MapEvent, MapSurface};
use std::sync::Arc;

/// Root of the viewer: owns the selected position and road and threads them
/// between the search panel and the map canvas.
pub struct FloodViewer<S: MapSurface> {
    canvas: MapCanvas<S>,
    search: SearchPanel,
    selected_position: Option<Coordinates>,
    selected_road: Vec<Way>,
    severity_score: f64,
    geocoder: Arc<dyn Geocoder>,
    geometry: Arc<dyn GeometrySource>,
    recent_searches: Option<PreferenceCell<Vec<String>>>,
}

impl<S: MapSurface> FloodViewer<S> {
    pub fn new(
        surface: S,
        geocoder: Arc<dyn Geocoder>,
        geometry: Arc<dyn GeometrySource>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        FloodViewer {
            canvas: MapCanvas::new(surface, alerts),
            search: SearchPanel::new(),
            selected_position: None,
            selected_road: Vec::new(),
            severity_score: 0.0,
            geocoder,
            geometry,
            recent_searches: None,
        }
    }

    /// Remember submitted queries in `store`.
    pub fn with_recent_searches(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        self.recent_searches = Some(PreferenceCell::load(store, RECENT_SEARCHES_KEY, Vec::new()));
        self
    }

    pub fn mount(&mut self) {
        self.canvas.mount();
    }

    pub fn type_query(&mut self, text: impl Into<String>) {
        self.search.set_text(text);
    }

    pub fn focus_search(&mut self) {
        self.search.focus_input();
    }

    pub async fn submit_search(&mut self) -> bool {
        if let Some(recent) = self.recent_searches.as_mut() {
            remember_search(recent, self.search.text());
        }

        let geocoder = self.geocoder.clone();
        self.search.submit(geocoder.as_ref()).await
    }

    /// Pick a candidate, fetch its ways and redraw the map.
    pub async fn select_candidate(&mut self, index: usize) -> bool {
        let Some(pending) = self.search.select(index) else {
            return false;
        };
        self.selected_position = Some(pending.position);

        let geometry = self.geometry.clone();
        let result = geometry.ways_named(&pending.name).await;

        match self.search.finish_selection(&pending, result) {
            Some(ways) => {
                self.selected_road = ways;
                self.redraw();
                true
            }
            None => false,
        }
    }

    /// Supply a fresh severity score; the current selection is recolored.
    pub fn set_severity_score(&mut self, score: f64) {
        self.severity_score = score;
        self.redraw();
    }

    pub fn handle_map_event(&mut self, event: MapEvent) {
        if let Some(CanvasEffect::HideResults) = self.canvas.handle_event(event) {
            self.search.hide_results();
        }
    }

    fn redraw(&mut self) {
        self.canvas.show_selection(
            self.selected_position,
            &self.selected_road,
            self.severity_score,
        );
    }

    pub fn selected_position(&self) -> Option<Coordinates> {
        self.selected_position
    }

    pub fn selected_road(&self) -> &[Way] {
        &self.selected_road
    }

    pub fn severity_score(&self) -> f64 {
        self.severity_score
    }

    pub fn search(&self) -> &SearchPanel {
        &self.search
    }

    pub fn canvas(&self) -> &MapCanvas<S> {
        &self.canvas
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        legend()
    }

    pub fn recent_searches(&self) -> &[String] {
        self.recent_searches
            .as_ref()
            .map(|r| r.get().as_slice())
            .unwrap_or_default()
    }
}

/// Move `query` to the front of the recent list, capped at
/// `MAX_RECENT_SEARCHES`. Blank queries are not recorded.
pub fn remember_search(recent: &mut PreferenceCell<Vec<String>>, query: &str) {
    let query = query.trim();
    if query.is_empty() {
        return;
    }

    recent.update(|list| {
        list.retain(|q| q != query);
        list.insert(0, query.to_string());
        list.truncate(MAX_RECENT_SEARCHES);
    });
}
