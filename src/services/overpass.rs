use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::way::{filter_ways, OverpassResponse};
use crate::models::Way;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Road geometry client for the Overpass API with endpoint failover
#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    endpoints: Vec<String>,
    current_endpoint_idx: Arc<AtomicUsize>,
    max_retries: usize,
    backoff_base_ms: u64,
}

impl OverpassClient {
    pub fn new() -> Self {
        let endpoints: Vec<String> = DEFAULT_OVERPASS_ENDPOINTS
            .iter()
            .map(|s| s.to_string())
            .collect();

        OverpassClient {
            client: Client::new(),
            endpoints,
            current_endpoint_idx: Arc::new(AtomicUsize::new(0)),
            max_retries: OVERPASS_RETRY_MAX_ATTEMPTS,
            backoff_base_ms: OVERPASS_RETRY_BACKOFF_BASE_MS,
        }
    }

    pub fn with_config(
        endpoints: Vec<String>,
        max_retries: usize,
        backoff_base_ms: u64,
    ) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(AppError::InvalidRequest(
                "At least one Overpass endpoint required".to_string(),
            ));
        }

        Ok(OverpassClient {
            client: Client::new(),
            endpoints,
            current_endpoint_idx: Arc::new(AtomicUsize::new(0)),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Get the next endpoint to try (round-robin)
    fn get_next_endpoint(&self) -> &str {
        let idx = self.current_endpoint_idx.fetch_add(1, Ordering::Relaxed);
        &self.endpoints[idx % self.endpoints.len()]
    }

    /// Fetch every way whose `name` tag equals `name`, with full geometry.
    ///
    /// Matching is by name string, so distinct roads that share a name come
    /// back together.
    pub async fn query_ways_by_name(&self, name: &str) -> Result<Vec<Way>> {
        let query = build_ways_by_name_query(name);

        tracing::debug!("Overpass query: {}", query);

        let ways = self.execute_query_with_retry(&query).await?;

        tracing::info!("Overpass returned {} ways named {:?}", ways.len(), name);

        Ok(ways)
    }

    /// POST `query`, retrying transport failures, 429 and 504 with
    /// exponential backoff. Each attempt moves on to the next endpoint.
    async fn execute_query_with_retry(&self, query: &str) -> Result<Vec<Way>> {
        let attempts = self.max_retries + 1;
        let mut attempt = 1;

        loop {
            let endpoint = self.get_next_endpoint();

            match self.send_once(endpoint, query).await {
                Ok(ways) => return Ok(ways),
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Retryable(reason)) if attempt < attempts => {
                    let backoff_ms = self.backoff_ms(attempt);
                    tracing::warn!(
                        "Overpass {} at {}, retrying in {}ms (attempt {}/{})",
                        reason,
                        endpoint,
                        backoff_ms,
                        attempt + 1,
                        attempts
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    attempt += 1;
                }
                Err(Attempt::Retryable(reason)) => {
                    return Err(AppError::OverpassApi(format!(
                        "{} after {} attempts",
                        reason, attempts
                    )));
                }
            }
        }
    }

    async fn send_once(
        &self,
        endpoint: &str,
        query: &str,
    ) -> std::result::Result<Vec<Way>, Attempt> {
        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!("data={}", urlencoding::encode(query)))
            .timeout(Duration::from_secs(OVERPASS_QUERY_TIMEOUT_SECONDS + 5))
            .send()
            .await
            .map_err(|e| {
                Attempt::Retryable(if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("request failed: {}", e)
                })
            })?;

        let status = response.status();
        if status.is_success() {
            let body: OverpassResponse = response.json().await.map_err(|e| {
                Attempt::Fatal(AppError::OverpassApi(format!(
                    "Failed to parse response: {}",
                    e
                )))
            })?;
            return Ok(filter_ways(body.elements));
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let reason = format!("HTTP {}: {}", status, text);

        if status == OVERPASS_HTTP_TOO_MANY_REQUESTS || status == OVERPASS_HTTP_GATEWAY_TIMEOUT {
            Err(Attempt::Retryable(reason))
        } else {
            Err(Attempt::Fatal(AppError::OverpassApi(reason)))
        }
    }

    fn backoff_ms(&self, retry: usize) -> u64 {
        self.backoff_base_ms * 2_u64.pow(retry as u32)
    }
}

/// Outcome of one failed request.
enum Attempt {
    Retryable(String),
    Fatal(AppError),
}

impl Default for OverpassClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Overpass QL for all ways named exactly `name`, with inline geometry
pub fn build_ways_by_name_query(name: &str) -> String {
    format!(
        "[out:json][timeout:{}];\nway[\"name\"=\"{}\"];\nout geom;",
        OVERPASS_QUERY_TIMEOUT_SECONDS,
        escape_overpass_string(name)
    )
}

fn escape_overpass_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
