//! Machine-readable API description
//!
//! GET /api/openapi.json serves a static OpenAPI 3.0.3 document. Nothing at
//! runtime depends on it.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

fn id_param(name: &str) -> Value {
    json!({
        "in": "path",
        "name": name,
        "required": true,
        "schema": { "type": "integer" }
    })
}

fn search_param(description: &str) -> Value {
    json!({
        "in": "query",
        "name": "q",
        "schema": { "type": "string" },
        "description": description
    })
}

fn json_body(schema: Value) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema } }
    })
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

/// `Track` and `Playlist` component schemas
fn schemas() -> Value {
    json!({
        "Track": {
            "type": "object",
            "properties": {
                "id": { "type": "integer", "example": 1 },
                "title": { "type": "string", "example": "Blinding Lights" },
                "artist": { "type": "string", "example": "The Weeknd" },
                "url": { "type": "string", "example": "https://example.com/track.mp3" },
                "durationSec": { "type": "integer", "example": 387, "minimum": 0 }
            }
        },
        "Playlist": {
            "type": "object",
            "properties": {
                "id": { "type": "integer", "example": 1 },
                "name": { "type": "string", "example": "My Playlist" },
                "description": { "type": "string", "example": "Notes" },
                "tags": { "type": "array", "items": { "type": "string" } },
                "tracks": { "type": "array", "items": schema_ref("Track") }
            }
        }
    })
}

/// Build the OpenAPI document for every route the service exposes
pub fn openapi_document() -> Value {
    let playlist_id = id_param("id");
    let track_id = id_param("trackId");

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Playlist API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "In-memory playlist REST API"
        },
        "paths": {
            "/api/health": {
                "get": {
                    "summary": "Service health and uptime",
                    "responses": { "200": { "description": "OK" } }
                }
            },
            "/api/playlists": {
                "get": {
                    "summary": "List playlists",
                    "parameters": [search_param("Search by name/description/tag")],
                    "responses": { "200": { "description": "OK" } }
                },
                "post": {
                    "summary": "Create a playlist",
                    "requestBody": json_body(json!({
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "description": { "type": "string" },
                            "tags": { "type": "array", "items": { "type": "string" } }
                        }
                    })),
                    "responses": {
                        "201": { "description": "Created" },
                        "400": { "description": "Bad request" }
                    }
                }
            },
            "/api/playlists/{id}": {
                "get": {
                    "summary": "Get playlist by id",
                    "parameters": [playlist_id],
                    "responses": {
                        "200": { "description": "OK" },
                        "404": { "description": "Not found" }
                    }
                },
                "put": {
                    "summary": "Replace playlist",
                    "parameters": [playlist_id],
                    "requestBody": json_body(schema_ref("Playlist")),
                    "responses": {
                        "200": { "description": "OK" },
                        "400": { "description": "Bad request" },
                        "404": { "description": "Not found" }
                    }
                },
                "patch": {
                    "summary": "Update playlist (partial)",
                    "parameters": [playlist_id],
                    "requestBody": json_body(json!({ "type": "object" })),
                    "responses": {
                        "200": { "description": "OK" },
                        "404": { "description": "Not found" }
                    }
                },
                "delete": {
                    "summary": "Delete playlist",
                    "parameters": [playlist_id],
                    "responses": {
                        "204": { "description": "No Content" },
                        "404": { "description": "Not found" }
                    }
                }
            },
            "/api/playlists/{id}/tracks": {
                "get": {
                    "summary": "List/search tracks within a playlist",
                    "parameters": [playlist_id, search_param("Search by title or artist")],
                    "responses": {
                        "200": { "description": "OK" },
                        "404": { "description": "Playlist not found" }
                    }
                },
                "post": {
                    "summary": "Add a track (or multiple tracks) to the playlist",
                    "parameters": [playlist_id],
                    "requestBody": json_body(json!({
                        "oneOf": [
                            schema_ref("Track"),
                            { "type": "array", "items": schema_ref("Track") }
                        ]
                    })),
                    "responses": {
                        "201": { "description": "Created" },
                        "400": { "description": "Bad request" },
                        "404": { "description": "Playlist not found" }
                    }
                }
            },
            "/api/playlists/{id}/tracks/{trackId}": {
                "get": {
                    "summary": "Get a single track in the playlist",
                    "parameters": [playlist_id, track_id],
                    "responses": {
                        "200": { "description": "OK" },
                        "404": { "description": "Playlist or track not found" }
                    }
                },
                "put": {
                    "summary": "Replace a track in the playlist",
                    "parameters": [playlist_id, track_id],
                    "requestBody": json_body(schema_ref("Track")),
                    "responses": {
                        "200": { "description": "OK" },
                        "400": { "description": "Bad request" },
                        "404": { "description": "Playlist or track not found" }
                    }
                },
                "patch": {
                    "summary": "Update a track (partial) in the playlist",
                    "parameters": [playlist_id, track_id],
                    "requestBody": json_body(json!({ "type": "object" })),
                    "responses": {
                        "200": { "description": "OK" },
                        "404": { "description": "Playlist or track not found" }
                    }
                },
                "delete": {
                    "summary": "Remove a track from the playlist",
                    "parameters": [playlist_id, track_id],
                    "responses": {
                        "204": { "description": "No Content" },
                        "404": { "description": "Playlist or track not found" }
                    }
                }
            }
        },
        "components": { "schemas": schemas() }
    })
}

/// GET /api/openapi.json
pub async fn get_openapi() -> Json<Value> {
    Json(openapi_document())
}

/// Build API description routes
pub fn openapi_routes() -> Router<AppState> {
    Router::new().route(
        "/api/openapi.json",
        get(get_openapi).fallback(super::route_not_found),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = openapi_document();
        let paths = doc["paths"].as_object().unwrap();
        for path in [
            "/api/health",
            "/api/playlists",
            "/api/playlists/{id}",
            "/api/playlists/{id}/tracks",
            "/api/playlists/{id}/tracks/{trackId}",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
        assert_eq!(doc["paths"]["/api/playlists/{id}/tracks/{trackId}"].as_object().unwrap().len(), 4);
        assert!(doc["components"]["schemas"]["Track"]["properties"]["durationSec"].is_object());
    }
}
