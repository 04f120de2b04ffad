//! Playlist and track models
//!
//! Field names follow the JSON API (`durationSec`, `trackCount`).

use serde::Serialize;

/// A single media item inside a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub artist: String,
    pub url: String,
    pub duration_sec: u64,
}

/// A named, ordered collection of tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Case-insensitive match of a lowercased needle against name,
    /// description or any tag
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

impl Track {
    /// Case-insensitive match of a lowercased needle against title or artist
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.artist.to_lowercase().contains(needle)
    }
}

/// Playlist as returned by the list endpoint, annotated with its track count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub track_count: usize,
}

impl From<&Playlist> for PlaylistSummary {
    fn from(playlist: &Playlist) -> Self {
        Self {
            playlist: playlist.clone(),
            track_count: playlist.track_count(),
        }
    }
}
