//! HTTP API handlers for playlist-api

pub mod health;
pub mod openapi;
pub mod playlists;
pub mod tracks;

pub use health::health_routes;
pub use openapi::openapi_routes;
pub use playlists::playlist_routes;
pub use tracks::track_routes;

use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, MatchedPath, Path, Query},
    http::{request::Parts, Uri},
};
use tracing::debug;

use crate::error::ApiError;

/// `?q=` search parameter shared by the list endpoints
///
/// Repeated `q` values are joined with commas. A query string that cannot
/// be decoded means no filter.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let values: Vec<String> = pairs
            .into_iter()
            .filter(|(key, _)| key == "q")
            .map(|(_, value)| value)
            .collect();

        Self {
            q: (!values.is_empty()).then(|| values.join(",")),
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SearchQuery {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pairs = match Query::<Vec<(String, String)>>::from_request_parts(parts, state).await {
            Ok(Query(pairs)) => pairs,
            Err(rejection) => {
                debug!("Ignoring undecodable query string: {}", rejection);
                Vec::new()
            }
        };
        Ok(Self::from_pairs(pairs))
    }
}

/// Ids named in the request path
///
/// A segment that is not a non-negative integer (or not even valid UTF-8
/// once decoded) reads as `None` and can never match an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathIds {
    pub playlist: Option<u64>,
    pub track: Option<u64>,
}

impl PathIds {
    fn from_params<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut ids = Self::default();
        for (key, raw) in params {
            match key {
                "id" => ids.playlist = parse_id(raw),
                "track_id" => ids.track = parse_id(raw),
                _ => {}
            }
        }
        ids
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PathIds {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<HashMap<String, String>>::from_request_parts(parts, state).await {
            Ok(Path(params)) => Ok(Self::from_params(
                params.iter().map(|(key, raw)| (key.as_str(), raw.as_str())),
            )),
            Err(rejection) => {
                debug!("Path parameters not decodable: {}", rejection);
                // Pair the route template with the still-encoded segments
                let template = parts
                    .extensions
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str)
                    .unwrap_or_default();
                let params = template
                    .split('/')
                    .zip(parts.uri.path().split('/'))
                    .filter_map(|(segment, raw)| segment.strip_prefix(':').map(|key| (key, raw)));
                Ok(Self::from_params(params))
            }
        }
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// Fallback for unmatched routes and unsupported methods
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id(" 3 "), Some(3));
        assert_eq!(parse_id("-1"), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("%FF"), None);
        assert_eq!(parse_id(""), None);
    }

    #[test]
    fn test_path_ids_by_name() {
        let ids = PathIds::from_params([("id", "4"), ("track_id", "x")]);
        assert_eq!(ids.playlist, Some(4));
        assert_eq!(ids.track, None);

        assert_eq!(PathIds::from_params(std::iter::empty()), PathIds::default());
    }

    #[test]
    fn test_search_query_joins_repeated_values() {
        assert_eq!(SearchQuery::from_pairs(pairs(&[])).q, None);
        assert_eq!(
            SearchQuery::from_pairs(pairs(&[("q", "demo")])).q.as_deref(),
            Some("demo")
        );
        assert_eq!(
            SearchQuery::from_pairs(pairs(&[("q", "demo"), ("page", "2"), ("q", "x")])).q.as_deref(),
            Some("demo,x")
        );
    }
}
