use crate::error::Result;
use crate::models::{Coordinates, PlaceCandidate, Way};
use crate::services::Geocoder;

/// Generation stamp for an in-flight geocode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// A candidate the user picked, waiting for its road geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSelection {
    generation: u64,
    pub position: Coordinates,
    pub name: String,
}

/// Search box and result list state.
///
/// Every request carries a generation stamp; a response older than the most
/// recent request of its kind is dropped, so overlapping searches can't
/// overwrite newer results.
#[derive(Debug, Default)]
pub struct SearchPanel {
    text: String,
    candidates: Vec<PlaceCandidate>,
    loading: bool,
    empty: bool,
    results_visible: bool,
    search_generation: u64,
    selection_generation: u64,
}

impl SearchPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn candidates(&self) -> &[PlaceCandidate] {
        &self.candidates
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True after a search that came back with no candidates.
    pub fn is_empty_result(&self) -> bool {
        self.empty
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn focus_input(&mut self) {
        self.results_visible = true;
    }

    pub fn hide_results(&mut self) {
        self.results_visible = false;
    }

    pub fn begin_search(&mut self) -> SearchTicket {
        self.search_generation += 1;
        self.loading = true;
        self.empty = false;
        SearchTicket(self.search_generation)
    }

    /// Apply a geocode response. Returns false if it was stale or failed.
    pub fn finish_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<Vec<PlaceCandidate>>,
    ) -> bool {
        if ticket.0 != self.search_generation {
            tracing::debug!(
                "Dropping stale search response (generation {}, latest {})",
                ticket.0,
                self.search_generation
            );
            return false;
        }

        self.loading = false;

        match result {
            Ok(candidates) => {
                self.empty = candidates.is_empty();
                self.candidates = candidates;
                true
            }
            Err(e) => {
                tracing::warn!("Place search failed: {}", e);
                false
            }
        }
    }

    /// Geocode the current text.
    pub async fn submit(&mut self, geocoder: &dyn Geocoder) -> bool {
        let ticket = self.begin_search();
        let query = self.text.clone();
        let result = geocoder.search(&query).await;
        self.finish_search(ticket, result)
    }

    /// Pick candidate `index`: hides the panel, clears the list and
    /// supersedes any search still in flight.
    pub fn select(&mut self, index: usize) -> Option<PendingSelection> {
        let candidate = self.candidates.get(index)?.clone();

        self.hide_results();
        self.candidates.clear();
        self.search_generation += 1;
        self.loading = false;
        self.selection_generation += 1;

        tracing::debug!("Selected {:?}", candidate.display_name);

        Some(PendingSelection {
            generation: self.selection_generation,
            position: candidate.position,
            name: candidate.name,
        })
    }

    /// Apply a geometry response for `pending`. Returns the ways to show, or
    /// None if the response is stale or failed.
    pub fn finish_selection(
        &mut self,
        pending: &PendingSelection,
        result: Result<Vec<Way>>,
    ) -> Option<Vec<Way>> {
        if pending.generation != self.selection_generation {
            tracing::debug!(
                "Dropping stale geometry for {:?} (generation {}, latest {})",
                pending.name,
                pending.generation,
                self.selection_generation
            );
            return None;
        }

        match result {
            Ok(ways) => Some(ways),
            Err(e) => {
                tracing::warn!("Geometry lookup for {:?} failed: {}", pending.name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;

    fn candidate(id: u64, name: &str) -> PlaceCandidate {
        PlaceCandidate {
            place_id: id,
            osm_id: Some(id as i64),
            name: name.to_string(),
            display_name: format!("{}, Metro Manila", name),
            position: Coordinates::new(14.6 + id as f64 / 100.0, 121.0).unwrap(),
            address: Default::default(),
        }
    }

    struct FixedGeocoder(Vec<PlaceCandidate>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn search(&self, _query: &str) -> Result<Vec<PlaceCandidate>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenGeocoder;

    #[async_trait]
    impl Geocoder for BrokenGeocoder {
        async fn search(&self, _query: &str) -> Result<Vec<PlaceCandidate>> {
            Err(AppError::GeocodingApi("connection reset".to_string()))
        }
    }

    #[test]
    fn begin_search_sets_loading() {
        let mut panel = SearchPanel::new();
        panel.begin_search();
        assert!(panel.is_loading());
        assert!(!panel.is_empty_result());
    }

    #[tokio::test]
    async fn empty_response_sets_empty_state() {
        let mut panel = SearchPanel::new();
        panel.set_text("No Such Road");

        assert!(panel.submit(&FixedGeocoder(vec![])).await);
        assert!(panel.is_empty_result());
        assert!(!panel.is_loading());
        assert!(panel.candidates().is_empty());
    }

    #[tokio::test]
    async fn results_populate_candidates() {
        let mut panel = SearchPanel::new();
        panel.set_text("EDSA");

        assert!(panel.submit(&FixedGeocoder(vec![candidate(1, "EDSA")])).await);
        assert!(!panel.is_empty_result());
        assert!(!panel.is_loading());
        assert_eq!(panel.candidates().len(), 1);
    }

    #[tokio::test]
    async fn failure_clears_loading_and_keeps_list() {
        let mut panel = SearchPanel::new();
        panel.set_text("EDSA");
        panel.submit(&FixedGeocoder(vec![candidate(1, "EDSA")])).await;

        assert!(!panel.submit(&BrokenGeocoder).await);
        assert!(!panel.is_loading());
        assert!(!panel.is_empty_result());
        assert_eq!(panel.candidates().len(), 1);
    }

    #[test]
    fn stale_search_response_dropped() {
        let mut panel = SearchPanel::new();
        let first = panel.begin_search();
        let second = panel.begin_search();

        assert!(panel.finish_search(second, Ok(vec![candidate(2, "Ortigas Avenue")])));
        assert!(!panel.finish_search(first, Ok(vec![candidate(1, "EDSA")])));

        assert_eq!(panel.candidates()[0].name, "Ortigas Avenue");
    }

    #[test]
    fn select_hides_panel_and_clears_list() {
        let mut panel = SearchPanel::new();
        let ticket = panel.begin_search();
        panel.finish_search(ticket, Ok(vec![candidate(1, "EDSA"), candidate(2, "C-5")]));
        panel.focus_input();
        assert!(panel.results_visible());

        let pending = panel.select(1).unwrap();
        assert_eq!(pending.name, "C-5");
        assert_eq!(pending.position, candidate(2, "C-5").position);
        assert!(!panel.results_visible());
        assert!(panel.candidates().is_empty());

        assert!(panel.select(0).is_none());
    }

    #[test]
    fn select_supersedes_in_flight_search() {
        let mut panel = SearchPanel::new();
        let ticket = panel.begin_search();
        panel.finish_search(ticket, Ok(vec![candidate(1, "EDSA")]));

        let late = panel.begin_search();
        panel.select(0).unwrap();

        assert!(!panel.finish_search(late, Ok(vec![candidate(9, "Late Road")])));
        assert!(panel.candidates().is_empty());
    }

    #[test]
    fn stale_geometry_dropped() {
        let mut panel = SearchPanel::new();
        let ticket = panel.begin_search();
        panel.finish_search(ticket, Ok(vec![candidate(1, "EDSA")]));
        let first = panel.select(0).unwrap();

        let ticket = panel.begin_search();
        panel.finish_search(ticket, Ok(vec![candidate(2, "C-5")]));
        let second = panel.select(0).unwrap();

        assert!(panel.finish_selection(&first, Ok(vec![])).is_none());
        assert!(panel.finish_selection(&second, Ok(vec![])).is_some());
    }

    #[test]
    fn failed_geometry_yields_nothing() {
        let mut panel = SearchPanel::new();
        let ticket = panel.begin_search();
        panel.finish_search(ticket, Ok(vec![candidate(1, "EDSA")]));
        let pending = panel.select(0).unwrap();

        let result = panel.finish_selection(
            &pending,
            Err(AppError::OverpassApi("HTTP 504".to_string())),
        );
        assert!(result.is_none());
    }
}
