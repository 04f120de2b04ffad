//! Request body parsing
//!
//! Bodies arrive as arbitrary JSON. Each operation has its own input type
//! built by an explicit parse step that either yields a fully typed value or
//! a [`ValidationError`], so handlers never mutate the store with a
//! half-checked payload.

use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons a request body is rejected with 400
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid JSON body: {0}")]
    MalformedJson(String),

    #[error("name is required (string)")]
    MissingName,

    #[error("title is required (string)")]
    MissingTitle,

    #[error("Each track requires a non-empty string \"title\"")]
    MissingTrackTitle,

    #[error("Track payload required")]
    EmptyTrackPayload,

    #[error("{0} must be a string")]
    NotAString(&'static str),

    #[error("tags must be an array of strings")]
    InvalidTags,
}

/// Decode a raw request body; an empty body reads as `{}`
pub fn parse_body(bytes: &[u8]) -> Result<Value, ValidationError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|e| ValidationError::MalformedJson(e.to_string()))
}

/// Accept integral JSON numbers (`5` or `5.0`) that fit a `u64`
pub fn non_negative_integer(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

/// `null` is treated the same as an absent field
fn field<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|v| !v.is_null())
}

fn required_non_empty(body: &Value, key: &str) -> Option<String> {
    match field(body, key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn optional_string(body: &Value, key: &'static str) -> Result<Option<String>, ValidationError> {
    match field(body, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::NotAString(key)),
    }
}

fn string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn optional_tags(body: &Value) -> Result<Option<Vec<String>>, ValidationError> {
    match field(body, "tags") {
        None => Ok(None),
        Some(value) => string_array(value).map(Some).ok_or(ValidationError::InvalidTags),
    }
}

fn string_or_empty(body: &Value, key: &str) -> String {
    field(body, key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn duration_or_zero(body: &Value) -> u64 {
    field(body, "durationSec")
        .and_then(non_negative_integer)
        .unwrap_or(0)
}

/// POST /api/playlists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl NewPlaylist {
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let name = required_non_empty(body, "name").ok_or(ValidationError::MissingName)?;
        Ok(Self {
            name,
            description: optional_string(body, "description")?.unwrap_or_default(),
            tags: optional_tags(body)?.unwrap_or_default(),
        })
    }
}

/// A track inside a full playlist replacement, normalized rather than validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDraft {
    /// Caller-supplied id; the store decides whether it can be kept
    pub id: Option<u64>,
    pub title: String,
    pub artist: String,
    pub url: String,
    pub duration_sec: u64,
}

impl TrackDraft {
    fn normalize(item: &Value) -> Self {
        Self {
            id: field(item, "id").and_then(non_negative_integer),
            title: string_or_empty(item, "title"),
            artist: string_or_empty(item, "artist"),
            url: string_or_empty(item, "url"),
            duration_sec: duration_or_zero(item),
        }
    }
}

/// PUT /api/playlists/:id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistReplacement {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub tracks: Vec<TrackDraft>,
}

impl PlaylistReplacement {
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let NewPlaylist {
            name,
            description,
            tags,
        } = NewPlaylist::from_json(body)?;

        let tracks = field(body, "tracks")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(TrackDraft::normalize).collect())
            .unwrap_or_default();

        Ok(Self {
            name,
            description,
            tags,
            tracks,
        })
    }
}

/// PATCH /api/playlists/:id
///
/// Only well-typed values are taken; anything else leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PlaylistPatch {
    pub fn from_json(body: &Value) -> Self {
        Self {
            name: required_non_empty(body, "name"),
            description: field(body, "description")
                .and_then(Value::as_str)
                .map(str::to_string),
            tags: field(body, "tags").and_then(string_array),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.tags.is_none()
    }
}

/// One track of a POST /api/playlists/:id/tracks body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub url: String,
    pub duration_sec: u64,
}

impl NewTrack {
    pub fn from_json(item: &Value) -> Result<Self, ValidationError> {
        let title = match field(item, "title") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => return Err(ValidationError::MissingTrackTitle),
        };
        Ok(Self {
            title,
            artist: string_or_empty(item, "artist"),
            url: string_or_empty(item, "url"),
            duration_sec: duration_or_zero(item),
        })
    }
}

/// Body shape of POST /api/playlists/:id/tracks; the response mirrors it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackPayload {
    Single(NewTrack),
    Batch(Vec<NewTrack>),
}

impl TrackPayload {
    /// Every item is checked before anything is returned, so a bad element
    /// rejects the whole batch.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        match body {
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(ValidationError::EmptyTrackPayload);
                }
                items
                    .iter()
                    .map(NewTrack::from_json)
                    .collect::<Result<Vec<_>, _>>()
                    .map(TrackPayload::Batch)
            }
            single => NewTrack::from_json(single).map(TrackPayload::Single),
        }
    }
}

/// PUT /api/playlists/:id/tracks/:trackId
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackReplacement {
    pub title: String,
    pub artist: String,
    pub url: String,
    pub duration_sec: u64,
}

impl TrackReplacement {
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let title = required_non_empty(body, "title").ok_or(ValidationError::MissingTitle)?;
        Ok(Self {
            title,
            artist: string_or_empty(body, "artist"),
            url: string_or_empty(body, "url"),
            duration_sec: duration_or_zero(body),
        })
    }
}

/// PATCH /api/playlists/:id/tracks/:trackId
///
/// Same rules as the playlist patch: `title` only changes to a non-empty
/// string, `artist` and `url` only to strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackPatch {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub url: Option<String>,
    /// Invalid durations are dropped here so the old value survives
    pub duration_sec: Option<u64>,
}

impl TrackPatch {
    pub fn from_json(body: &Value) -> Self {
        let text = |key: &str| field(body, key).and_then(Value::as_str).map(str::to_string);
        Self {
            title: required_non_empty(body, "title"),
            artist: text("artist"),
            url: text("url"),
            duration_sec: field(body, "durationSec").and_then(non_negative_integer),
        }
    }
}
