//! In-memory playlist store
//!
//! The store is the only owner of playlist and track state and the only
//! place identifiers are allocated. Playlist ids and track ids come from two
//! counters that only ever grow, so an id is never handed out twice even
//! after the entity holding it was deleted. Track ids share one counter
//! across all playlists.
//!
//! Every operation either finishes its mutation or leaves the store
//! untouched; handlers validate input before calling in.

use std::collections::HashSet;
use std::sync::Arc;

use playlist_common::{Playlist, PlaylistSummary, Track};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::input::{
    NewPlaylist, NewTrack, PlaylistPatch, PlaylistReplacement, TrackPatch, TrackReplacement,
};

/// Store handle shared by all handlers; one lock serializes every request
pub type SharedStore = Arc<Mutex<Store>>;

/// Lookup failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Playlist not found")]
    PlaylistNotFound,

    #[error("Track not found")]
    TrackNotFound,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub struct Store {
    playlists: Vec<Playlist>,
    next_playlist_id: u64,
    next_track_id: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased, trimmed search needle; `None` when there is nothing to filter on
fn normalize_query(query: Option<&str>) -> Option<String> {
    query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty())
}

impl Store {
    pub fn new() -> Self {
        Self {
            playlists: Vec::new(),
            next_playlist_id: 1,
            next_track_id: 1,
        }
    }

    /// Store holding the demo playlist the service starts with
    pub fn with_demo_data() -> Self {
        let mut store = Self::new();
        let id = store.allocate_playlist_id();

        let tracks = [
            ("Blinding Lights", "The Weeknd", 200),
            ("Levitating", "Dua Lipa", 203),
            ("Watermelon Sugar", "Harry Styles", 174),
            ("Save Your Tears", "The Weeknd", 195),
            ("Peaches", "Justin Bieber", 198),
        ]
        .into_iter()
        .map(|(title, artist, duration_sec)| {
            store.build_track(NewTrack {
                title: title.to_string(),
                artist: artist.to_string(),
                url: String::new(),
                duration_sec,
            })
        })
        .collect();

        store.playlists.push(Playlist {
            id,
            name: "Default Playlist".to_string(),
            description: "demo playlist".to_string(),
            tags: vec!["demo".to_string(), "default".to_string()],
            tracks,
        });
        store
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn allocate_playlist_id(&mut self) -> u64 {
        let id = self.next_playlist_id;
        self.next_playlist_id += 1;
        id
    }

    pub fn allocate_track_id(&mut self) -> u64 {
        let id = self.next_track_id;
        self.next_track_id += 1;
        id
    }

    pub fn playlist_count(&self) -> usize {
        self.playlists.len()
    }

    pub fn find_playlist(&self, id: u64) -> StoreResult<&Playlist> {
        self.playlists
            .iter()
            .find(|p| p.id == id)
            .ok_or(StoreError::PlaylistNotFound)
    }

    fn playlist_index(&self, id: u64) -> StoreResult<usize> {
        self.playlists
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::PlaylistNotFound)
    }

    fn find_playlist_mut(&mut self, id: u64) -> StoreResult<&mut Playlist> {
        self.playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::PlaylistNotFound)
    }

    /// Track lookup scoped to a single playlist
    pub fn find_track(&self, playlist_id: u64, track_id: u64) -> StoreResult<&Track> {
        self.find_playlist(playlist_id)?
            .tracks
            .iter()
            .find(|t| t.id == track_id)
            .ok_or(StoreError::TrackNotFound)
    }

    fn find_track_mut(&mut self, playlist_id: u64, track_id: u64) -> StoreResult<&mut Track> {
        self.find_playlist_mut(playlist_id)?
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or(StoreError::TrackNotFound)
    }

    /// All playlists in insertion order, optionally filtered by a
    /// case-insensitive match on name, description or tags
    pub fn list_playlists(&self, query: Option<&str>) -> Vec<PlaylistSummary> {
        let needle = normalize_query(query);
        self.playlists
            .iter()
            .filter(|p| needle.as_deref().map_or(true, |n| p.matches(n)))
            .map(PlaylistSummary::from)
            .collect()
    }

    pub fn create_playlist(&mut self, input: NewPlaylist) -> Playlist {
        let playlist = Playlist {
            id: self.allocate_playlist_id(),
            name: input.name,
            description: input.description,
            tags: input.tags,
            tracks: Vec::new(),
        };
        self.playlists.push(playlist.clone());
        playlist
    }

    /// Replace every field but the id, keeping the playlist's position
    ///
    /// A supplied track id survives when it was issued before, is not used
    /// by another playlist and is not repeated in the payload. Every other
    /// track gets a fresh id.
    pub fn replace_playlist(&mut self, id: u64, input: PlaylistReplacement) -> StoreResult<Playlist> {
        let index = self.playlist_index(id)?;

        let foreign_ids: HashSet<u64> = self
            .playlists
            .iter()
            .filter(|p| p.id != id)
            .flat_map(|p| p.tracks.iter().map(|t| t.id))
            .collect();

        let mut seen = HashSet::new();
        let mut tracks = Vec::with_capacity(input.tracks.len());
        for draft in input.tracks {
            let track_id = match draft.id {
                Some(candidate)
                    if candidate < self.next_track_id
                        && !foreign_ids.contains(&candidate)
                        && seen.insert(candidate) =>
                {
                    candidate
                }
                _ => {
                    let fresh = self.allocate_track_id();
                    seen.insert(fresh);
                    fresh
                }
            };
            tracks.push(Track {
                id: track_id,
                title: draft.title,
                artist: draft.artist,
                url: draft.url,
                duration_sec: draft.duration_sec,
            });
        }

        let playlist = Playlist {
            id,
            name: input.name,
            description: input.description,
            tags: input.tags,
            tracks,
        };
        self.playlists[index] = playlist.clone();
        Ok(playlist)
    }

    pub fn update_playlist(&mut self, id: u64, patch: PlaylistPatch) -> StoreResult<Playlist> {
        let playlist = self.find_playlist_mut(id)?;
        if let Some(name) = patch.name {
            playlist.name = name;
        }
        if let Some(description) = patch.description {
            playlist.description = description;
        }
        if let Some(tags) = patch.tags {
            playlist.tags = tags;
        }
        Ok(playlist.clone())
    }

    /// Remove a playlist together with all of its tracks
    pub fn delete_playlist(&mut self, id: u64) -> StoreResult<Playlist> {
        let index = self.playlist_index(id)?;
        Ok(self.playlists.remove(index))
    }

    /// Tracks of a playlist, optionally filtered on title or artist
    pub fn list_tracks(&self, playlist_id: u64, query: Option<&str>) -> StoreResult<Vec<Track>> {
        let playlist = self.find_playlist(playlist_id)?;
        let needle = normalize_query(query);
        Ok(playlist
            .tracks
            .iter()
            .filter(|t| needle.as_deref().map_or(true, |n| t.matches(n)))
            .cloned()
            .collect())
    }

    fn build_track(&mut self, input: NewTrack) -> Track {
        Track {
            id: self.allocate_track_id(),
            title: input.title,
            artist: input.artist,
            url: input.url,
            duration_sec: input.duration_sec,
        }
    }

    pub fn add_track(&mut self, playlist_id: u64, input: NewTrack) -> StoreResult<Track> {
        let index = self.playlist_index(playlist_id)?;
        let track = self.build_track(input);
        self.playlists[index].tracks.push(track.clone());
        Ok(track)
    }

    /// Append tracks in input order, each with a fresh id
    pub fn add_tracks(&mut self, playlist_id: u64, inputs: Vec<NewTrack>) -> StoreResult<Vec<Track>> {
        let index = self.playlist_index(playlist_id)?;

        let created: Vec<Track> = inputs
            .into_iter()
            .map(|input| self.build_track(input))
            .collect();

        self.playlists[index].tracks.extend(created.iter().cloned());
        Ok(created)
    }

    /// Replace a track in place, keeping its id and position
    pub fn replace_track(
        &mut self,
        playlist_id: u64,
        track_id: u64,
        input: TrackReplacement,
    ) -> StoreResult<Track> {
        let track = self.find_track_mut(playlist_id, track_id)?;
        *track = Track {
            id: track_id,
            title: input.title,
            artist: input.artist,
            url: input.url,
            duration_sec: input.duration_sec,
        };
        Ok(track.clone())
    }

    pub fn update_track(&mut self, playlist_id: u64, track_id: u64, patch: TrackPatch) -> StoreResult<Track> {
        let track = self.find_track_mut(playlist_id, track_id)?;
        if let Some(title) = patch.title {
            track.title = title;
        }
        if let Some(artist) = patch.artist {
            track.artist = artist;
        }
        if let Some(url) = patch.url {
            track.url = url;
        }
        if let Some(duration_sec) = patch.duration_sec {
            track.duration_sec = duration_sec;
        }
        Ok(track.clone())
    }

    pub fn delete_track(&mut self, playlist_id: u64, track_id: u64) -> StoreResult<Track> {
        let playlist = self.find_playlist_mut(playlist_id)?;
        let index = playlist
            .tracks
            .iter()
            .position(|t| t.id == track_id)
            .ok_or(StoreError::TrackNotFound)?;
        Ok(playlist.tracks.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TrackDraft;

    fn new_playlist(name: &str) -> NewPlaylist {
        NewPlaylist {
            name: name.to_string(),
            description: String::new(),
            tags: Vec::new(),
        }
    }

    fn new_track(title: &str) -> NewTrack {
        NewTrack {
            title: title.to_string(),
            artist: String::new(),
            url: String::new(),
            duration_sec: 0,
        }
    }

    fn draft(id: Option<u64>, title: &str) -> TrackDraft {
        TrackDraft {
            id,
            title: title.to_string(),
            artist: String::new(),
            url: String::new(),
            duration_sec: 0,
        }
    }

    fn replacement(tracks: Vec<TrackDraft>) -> PlaylistReplacement {
        PlaylistReplacement {
            name: "Replaced".to_string(),
            description: String::new(),
            tags: Vec::new(),
            tracks,
        }
    }

    #[test]
    fn test_demo_data_layout() {
        let store = Store::with_demo_data();
        assert_eq!(store.playlist_count(), 1);

        let playlist = store.find_playlist(1).unwrap();
        assert_eq!(playlist.name, "Default Playlist");
        assert_eq!(playlist.tags, vec!["demo", "default"]);
        let ids: Vec<u64> = playlist.tracks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(playlist.tracks[0].title, "Blinding Lights");
        assert_eq!(playlist.tracks[4].duration_sec, 198);

        assert_eq!(store.next_playlist_id, 2);
        assert_eq!(store.next_track_id, 6);
    }

    #[test]
    fn test_ids_never_reused_after_delete() {
        let mut store = Store::new();
        let first = store.create_playlist(new_playlist("a"));
        store.delete_playlist(first.id).unwrap();
        let second = store.create_playlist(new_playlist("b"));
        assert!(second.id > first.id);

        let tracks = store.add_tracks(second.id, vec![new_track("x")]).unwrap();
        store.delete_track(second.id, tracks[0].id).unwrap();
        let again = store.add_tracks(second.id, vec![new_track("y")]).unwrap();
        assert!(again[0].id > tracks[0].id);
    }

    #[test]
    fn test_track_counter_shared_across_playlists() {
        let mut store = Store::new();
        let a = store.create_playlist(new_playlist("a"));
        let b = store.create_playlist(new_playlist("b"));
        let ta = store.add_tracks(a.id, vec![new_track("1")]).unwrap();
        let tb = store.add_tracks(b.id, vec![new_track("2")]).unwrap();
        assert_eq!(ta[0].id, 1);
        assert_eq!(tb[0].id, 2);
    }

    #[test]
    fn test_find_track_scoped_to_playlist() {
        let mut store = Store::new();
        let a = store.create_playlist(new_playlist("a"));
        let b = store.create_playlist(new_playlist("b"));
        let track = store.add_track(a.id, new_track("only in a")).unwrap();

        assert!(store.find_track(a.id, track.id).is_ok());
        assert_eq!(store.find_track(b.id, track.id), Err(StoreError::TrackNotFound));
        assert_eq!(store.find_track(99, track.id), Err(StoreError::PlaylistNotFound));
    }

    #[test]
    fn test_list_playlists_filters_case_insensitively() {
        let mut store = Store::with_demo_data();
        store.create_playlist(NewPlaylist {
            name: "Jazz Nights".to_string(),
            description: "smooth".to_string(),
            tags: vec!["Chill".to_string()],
        });

        assert_eq!(store.list_playlists(None).len(), 2);
        assert_eq!(store.list_playlists(Some("   ")).len(), 2);

        let demo = store.list_playlists(Some("DEMO"));
        assert_eq!(demo.len(), 1);
        assert_eq!(demo[0].track_count, 5);

        let chill = store.list_playlists(Some("chill"));
        assert_eq!(chill.len(), 1);
        assert_eq!(chill[0].playlist.name, "Jazz Nights");
        assert_eq!(chill[0].track_count, 0);
    }

    #[test]
    fn test_list_tracks_search() {
        let store = Store::with_demo_data();
        let weeknd = store.list_tracks(1, Some("weeknd")).unwrap();
        assert_eq!(weeknd.len(), 2);
        let sugar = store.list_tracks(1, Some(" Sugar ")).unwrap();
        assert_eq!(sugar[0].id, 3);
        assert_eq!(store.list_tracks(2, None), Err(StoreError::PlaylistNotFound));
    }

    #[test]
    fn test_replace_playlist_keeps_id_and_allocates_missing_track_ids() {
        let mut store = Store::with_demo_data();
        let replaced = store
            .replace_playlist(1, replacement(vec![draft(Some(2), "kept"), draft(None, "new")]))
            .unwrap();

        assert_eq!(replaced.id, 1);
        assert_eq!(replaced.name, "Replaced");
        assert_eq!(replaced.tracks[0].id, 2);
        assert_eq!(replaced.tracks[1].id, 6);
        assert_eq!(store.find_playlist(1).unwrap(), &replaced);
    }

    #[test]
    fn test_replace_playlist_reallocates_conflicting_ids() {
        let mut store = Store::new();
        let a = store.create_playlist(new_playlist("a"));
        let b = store.create_playlist(new_playlist("b"));
        let owned = store.add_track(a.id, new_track("a1")).unwrap();
        let own = store.add_tracks(b.id, vec![new_track("b1"), new_track("b2")]).unwrap();
        assert_eq!(own[1].id, 3);

        let replaced = store
            .replace_playlist(
                b.id,
                replacement(vec![
                    draft(Some(owned.id), "taken by a"),
                    draft(Some(3), "kept"),
                    draft(Some(3), "repeated"),
                    draft(Some(40), "never issued"),
                ]),
            )
            .unwrap();

        let ids: Vec<u64> = replaced.tracks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 3, 5, 6]);
        assert_eq!(store.allocate_track_id(), 7);
    }

    #[test]
    fn test_replace_playlist_ignores_huge_track_ids() {
        let mut store = Store::with_demo_data();
        let replaced = store
            .replace_playlist(
                1,
                replacement(vec![draft(Some(u64::MAX), "big"), draft(Some(u64::MAX - 1), "bigger")]),
            )
            .unwrap();

        let ids: Vec<u64> = replaced.tracks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![6, 7]);

        let added = store.add_tracks(1, vec![new_track("a"), new_track("b")]).unwrap();
        assert_eq!(added[0].id, 8);
        assert_eq!(added[1].id, 9);
    }

    #[test]
    fn test_replace_unknown_playlist_leaves_counters() {
        let mut store = Store::new();
        let result = store.replace_playlist(5, replacement(vec![draft(None, "x")]));
        assert_eq!(result, Err(StoreError::PlaylistNotFound));
        assert_eq!(store.allocate_track_id(), 1);
    }

    #[test]
    fn test_update_playlist_only_touches_supplied_fields() {
        let mut store = Store::with_demo_data();
        let before = store.find_playlist(1).unwrap().clone();
        let updated = store
            .update_playlist(
                1,
                PlaylistPatch {
                    description: Some("x".to_string()),
                    ..PlaylistPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.description, "x");
        assert_eq!(updated.name, before.name);
        assert_eq!(updated.tags, before.tags);
        assert_eq!(updated.tracks, before.tracks);
    }

    #[test]
    fn test_delete_playlist_discards_tracks() {
        let mut store = Store::with_demo_data();
        let removed = store.delete_playlist(1).unwrap();
        assert_eq!(removed.tracks.len(), 5);
        assert_eq!(store.find_track(1, 1), Err(StoreError::PlaylistNotFound));
        assert_eq!(store.delete_playlist(1), Err(StoreError::PlaylistNotFound));
    }

    #[test]
    fn test_track_replace_and_update_keep_position() {
        let mut store = Store::with_demo_data();
        let replaced = store
            .replace_track(
                1,
                3,
                TrackReplacement {
                    title: "New".to_string(),
                    artist: String::new(),
                    url: String::new(),
                    duration_sec: 10,
                },
            )
            .unwrap();
        assert_eq!(replaced.id, 3);
        assert_eq!(store.find_playlist(1).unwrap().tracks[2], replaced);

        let updated = store
            .update_track(
                1,
                3,
                TrackPatch {
                    artist: Some("Someone".to_string()),
                    ..TrackPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.artist, "Someone");
        assert_eq!(updated.duration_sec, 10);
    }

    #[test]
    fn test_delete_track_missing() {
        let mut store = Store::with_demo_data();
        assert!(store.delete_track(1, 5).is_ok());
        assert_eq!(store.delete_track(1, 5), Err(StoreError::TrackNotFound));
        assert_eq!(store.find_playlist(1).unwrap().track_count(), 4);
    }
}
