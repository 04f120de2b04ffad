//! Error types for playlist-api
//!
//! Every failure is request-scoped and turns into a JSON body of the form
//! `{"error": "<message>"}`; unmatched routes also echo the request path.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::input::ValidationError;
use crate::store::StoreError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or wrong-typed field (400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Playlist or track id absent (404)
    #[error("{0}")]
    NotFound(String),

    /// No handler matched method + path (404)
    #[error("Not found")]
    RouteNotFound(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::RouteNotFound(path) => json!({
                "error": self.to_string(),
                "path": path,
            }),
            _ => json!({
                "error": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ValidationError::MissingName).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::TrackNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::RouteNotFound("/nope".to_string()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::from(ValidationError::MissingName).to_string(),
            "name is required (string)"
        );
        assert_eq!(
            ApiError::from(StoreError::PlaylistNotFound).to_string(),
            "Playlist not found"
        );
        assert_eq!(ApiError::RouteNotFound("/x".to_string()).to_string(), "Not found");
    }
}
