use crate::error::{AppError, Result};
use crate::models::PlaceCandidate;
use crate::viewer::app::remember_search;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters for road search
#[derive(Debug, Deserialize)]
pub struct SearchQueryParams {
    /// Free-text road name
    #[serde(default)]
    pub q: String,
}

impl SearchQueryParams {
    pub fn validate(&self) -> Result<()> {
        if self.q.trim().is_empty() {
            return Err(AppError::InvalidRequest("q must not be empty".to_string()));
        }
        if self.q.len() > 200 {
            return Err(AppError::InvalidRequest(
                "q must be at most 200 characters".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub candidates: Vec<PlaceCandidate>,
    pub count: usize,
    /// True when the geocoder found nothing
    pub empty: bool,
}

/// GET /search - Geocode a road name into candidate places
pub async fn search_places(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQueryParams>,
) -> Result<Json<SearchResponse>> {
    params.validate()?;
    let query = params.q.trim().to_string();

    tracing::info!("Road search: {:?}", query);

    // Persisting may hit the preference file, so keep it off the async workers
    let recorder = state.clone();
    let recorded = query.clone();
    tokio::task::spawn_blocking(move || {
        let mut recent = recorder
            .recent_searches
            .lock()
            .map_err(|_| AppError::Internal("recent searches lock poisoned".to_string()))?;
        remember_search(&mut recent, &recorded);
        Ok::<_, AppError>(())
    })
    .await
    .map_err(|e| AppError::Internal(format!("recent search task failed: {}", e)))??;

    let candidates = state.geocoder.search(&query).await?;
    let count = candidates.len();

    Ok(Json(SearchResponse {
        query,
        empty: candidates.is_empty(),
        candidates,
        count,
    }))
}

#[derive(Debug, Serialize)]
pub struct RecentSearchesResponse {
    pub searches: Vec<String>,
}

/// GET /search/recent - Most recent queries, newest first
pub async fn recent_searches(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RecentSearchesResponse>> {
    let recent = state
        .recent_searches
        .lock()
        .map_err(|_| AppError::Internal("recent searches lock poisoned".to_string()))?;

    Ok(Json(RecentSearchesResponse {
        searches: recent.get().clone(),
    }))
}
