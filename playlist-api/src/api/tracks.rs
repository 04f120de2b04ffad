//! Track handlers, scoped under a playlist
//!
//! GET/POST /api/playlists/:id/tracks,
//! GET/PUT/PATCH/DELETE /api/playlists/:id/tracks/:trackId

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use playlist_common::Track;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{route_not_found, PathIds, SearchQuery};
use crate::error::ApiResult;
use crate::input::{parse_body, TrackPatch, TrackPayload, TrackReplacement};
use crate::store::StoreError;
use crate::AppState;

/// Response of POST .../tracks: one object for one object, an array for an array
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CreatedTracks {
    One(Track),
    Many(Vec<Track>),
}

fn playlist_of(ids: PathIds) -> Result<u64, StoreError> {
    ids.playlist.ok_or(StoreError::PlaylistNotFound)
}

fn track_of(ids: PathIds) -> Result<u64, StoreError> {
    ids.track.ok_or(StoreError::TrackNotFound)
}

/// GET /api/playlists/:id/tracks?q=
///
/// Searches title and artist.
pub async fn list_tracks(
    State(state): State<AppState>,
    ids: PathIds,
    query: SearchQuery,
) -> ApiResult<Json<Vec<Track>>> {
    let playlist_id = playlist_of(ids)?;
    let store = state.store.lock().await;
    let tracks = store.list_tracks(playlist_id, query.q.as_deref())?;
    debug!(playlist_id, query = ?query.q, results = tracks.len(), "List tracks");
    Ok(Json(tracks))
}

/// GET /api/playlists/:id/tracks/:trackId
pub async fn get_track(
    State(state): State<AppState>,
    ids: PathIds,
) -> ApiResult<Json<Track>> {
    let playlist_id = playlist_of(ids)?;
    let store = state.store.lock().await;
    store.find_playlist(playlist_id)?;

    let track_id = track_of(ids)?;
    let track = store.find_track(playlist_id, track_id)?;
    Ok(Json(track.clone()))
}

/// POST /api/playlists/:id/tracks
///
/// Accepts one track or an array. The whole body is validated before the
/// playlist is touched, so a single bad item rejects the batch.
pub async fn add_tracks(
    State(state): State<AppState>,
    ids: PathIds,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<CreatedTracks>)> {
    let body = parse_body(&body)?;
    let playlist_id = playlist_of(ids)?;

    let mut store = state.store.lock().await;
    store.find_playlist(playlist_id)?;

    let payload = TrackPayload::from_json(&body)
        .inspect_err(|e| warn!(playlist_id, "Rejected track create: {}", e))?;
    let response = match payload {
        TrackPayload::Single(input) => {
            let track = store.add_track(playlist_id, input)?;
            info!(playlist_id, track_id = track.id, "Added track");
            CreatedTracks::One(track)
        }
        TrackPayload::Batch(inputs) => {
            let tracks = store.add_tracks(playlist_id, inputs)?;
            info!(playlist_id, count = tracks.len(), "Added tracks");
            CreatedTracks::Many(tracks)
        }
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/playlists/:id/tracks/:trackId
pub async fn replace_track(
    State(state): State<AppState>,
    ids: PathIds,
    body: Bytes,
) -> ApiResult<Json<Track>> {
    let body = parse_body(&body)?;
    let playlist_id = playlist_of(ids)?;

    let mut store = state.store.lock().await;
    store.find_playlist(playlist_id)?;
    let track_id = track_of(ids)?;
    store.find_track(playlist_id, track_id)?;

    let input = TrackReplacement::from_json(&body)
        .inspect_err(|e| warn!(playlist_id, track_id, "Rejected track replace: {}", e))?;
    let track = store.replace_track(playlist_id, track_id, input)?;
    info!(playlist_id, track_id, "Replaced track");

    Ok(Json(track))
}

/// PATCH /api/playlists/:id/tracks/:trackId
///
/// `durationSec` only changes when the new value is a non-negative integer.
pub async fn update_track(
    State(state): State<AppState>,
    ids: PathIds,
    body: Bytes,
) -> ApiResult<Json<Track>> {
    let body = parse_body(&body)?;
    let playlist_id = playlist_of(ids)?;
    let patch = TrackPatch::from_json(&body);

    let mut store = state.store.lock().await;
    store.find_playlist(playlist_id)?;
    let track_id = track_of(ids)?;

    let track = store.update_track(playlist_id, track_id, patch)?;
    info!(playlist_id, track_id, "Updated track");

    Ok(Json(track))
}

/// DELETE /api/playlists/:id/tracks/:trackId
pub async fn delete_track(
    State(state): State<AppState>,
    ids: PathIds,
) -> ApiResult<StatusCode> {
    let playlist_id = playlist_of(ids)?;

    let mut store = state.store.lock().await;
    store.find_playlist(playlist_id)?;
    let track_id = track_of(ids)?;

    store.delete_track(playlist_id, track_id)?;
    info!(playlist_id, track_id, "Deleted track");

    Ok(StatusCode::NO_CONTENT)
}

/// Build track routes
pub fn track_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/playlists/:id/tracks",
            get(list_tracks).post(add_tracks).fallback(route_not_found),
        )
        .route(
            "/api/playlists/:id/tracks/:track_id",
            get(get_track)
                .put(replace_track)
                .patch(update_track)
                .delete(delete_track)
                .fallback(route_not_found),
        )
}
