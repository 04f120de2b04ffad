//! Playlist CRUD handlers
//!
//! GET/POST /api/playlists, GET/PUT/PATCH/DELETE /api/playlists/:id

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use playlist_common::{Playlist, PlaylistSummary};
use tracing::{debug, info, warn};

use super::{route_not_found, PathIds, SearchQuery};
use crate::error::{ApiError, ApiResult};
use crate::input::{parse_body, NewPlaylist, PlaylistPatch, PlaylistReplacement};
use crate::store::StoreError;
use crate::AppState;

/// Playlist routes answer a bare "Not found" for unknown ids
fn not_found(_: StoreError) -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

fn playlist_id(ids: PathIds) -> ApiResult<u64> {
    ids.playlist.ok_or_else(|| not_found(StoreError::PlaylistNotFound))
}

/// GET /api/playlists?q=
///
/// Every playlist in insertion order, each with a computed `trackCount`.
pub async fn list_playlists(
    State(state): State<AppState>,
    query: SearchQuery,
) -> Json<Vec<PlaylistSummary>> {
    let store = state.store.lock().await;
    let playlists = store.list_playlists(query.q.as_deref());
    debug!(query = ?query.q, results = playlists.len(), "List playlists");
    Json(playlists)
}

/// GET /api/playlists/:id
pub async fn get_playlist(
    State(state): State<AppState>,
    ids: PathIds,
) -> ApiResult<Json<Playlist>> {
    let id = playlist_id(ids)?;
    let store = state.store.lock().await;
    let playlist = store.find_playlist(id).map_err(not_found)?;
    Ok(Json(playlist.clone()))
}

/// POST /api/playlists
pub async fn create_playlist(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Playlist>)> {
    let body = parse_body(&body)?;
    let input =
        NewPlaylist::from_json(&body).inspect_err(|e| warn!("Rejected playlist create: {}", e))?;

    let mut store = state.store.lock().await;
    let playlist = store.create_playlist(input);
    info!(playlist_id = playlist.id, name = %playlist.name, "Created playlist");

    Ok((StatusCode::CREATED, Json(playlist)))
}

/// PUT /api/playlists/:id
///
/// Replaces the whole record, tracks included; only the id survives.
pub async fn replace_playlist(
    State(state): State<AppState>,
    ids: PathIds,
    body: Bytes,
) -> ApiResult<Json<Playlist>> {
    let body = parse_body(&body)?;
    let id = playlist_id(ids)?;

    let mut store = state.store.lock().await;
    store.find_playlist(id).map_err(not_found)?;

    let input = PlaylistReplacement::from_json(&body)
        .inspect_err(|e| warn!(playlist_id = id, "Rejected playlist replace: {}", e))?;
    let playlist = store.replace_playlist(id, input).map_err(not_found)?;
    info!(playlist_id = id, tracks = playlist.tracks.len(), "Replaced playlist");

    Ok(Json(playlist))
}

/// PATCH /api/playlists/:id
///
/// Applies `name`, `description` and `tags` when present; other keys are ignored.
pub async fn update_playlist(
    State(state): State<AppState>,
    ids: PathIds,
    body: Bytes,
) -> ApiResult<Json<Playlist>> {
    let body = parse_body(&body)?;
    let id = playlist_id(ids)?;
    let patch = PlaylistPatch::from_json(&body);
    if patch.is_empty() {
        debug!(playlist_id = id, "Playlist patch carries no applicable fields");
    }

    let mut store = state.store.lock().await;
    let playlist = store.update_playlist(id, patch).map_err(not_found)?;
    info!(playlist_id = id, "Updated playlist");

    Ok(Json(playlist))
}

/// DELETE /api/playlists/:id
pub async fn delete_playlist(
    State(state): State<AppState>,
    ids: PathIds,
) -> ApiResult<StatusCode> {
    let id = playlist_id(ids)?;

    let mut store = state.store.lock().await;
    let removed = store.delete_playlist(id).map_err(not_found)?;
    info!(playlist_id = id, tracks = removed.tracks.len(), "Deleted playlist");

    Ok(StatusCode::NO_CONTENT)
}

/// Build playlist routes
pub fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/playlists",
            get(list_playlists)
                .post(create_playlist)
                .fallback(route_not_found),
        )
        .route(
            "/api/playlists/:id",
            get(get_playlist)
                .put(replace_playlist)
                .patch(update_playlist)
                .delete(delete_playlist)
                .fallback(route_not_found),
        )
}
