use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Geocoding API error: {0}")]
    GeocodingApi(String),

    #[error("Overpass API error: {0}")]
    OverpassApi(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::GeocodingApi(_) | AppError::OverpassApi(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Cache(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show a client. Upstream and internal details stay in the log.
    fn public_message(&self) -> &str {
        match self {
            AppError::GeocodingApi(_) => "Place search service error",
            AppError::OverpassApi(_) => "Road geometry service error",
            AppError::Cache(_) => "Cache error",
            AppError::Storage(_) => "Storage error",
            AppError::Internal(_) => "Internal server error",
            AppError::InvalidRequest(msg) => msg,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": self.public_message(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
