//! playlist-api library
//!
//! CRUD REST service for playlists and their tracks, backed by an
//! in-memory store. Exposes the router and state for the binary and for
//! integration tests.

pub mod api;
pub mod error;
pub mod input;
pub mod store;

pub use crate::error::{ApiError, ApiResult};
pub use crate::store::{SharedStore, Store};

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Playlist store guarded by a single lock
    pub store: SharedStore,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: store.into_shared(),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::playlist_routes())
        .merge(api::track_routes())
        .merge(api::health_routes())
        .merge(api::openapi_routes())
        .fallback(api::route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
