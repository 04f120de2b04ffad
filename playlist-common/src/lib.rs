//! # Playlist Common Library
//!
//! Shared code for the playlist service crates:
//! - Error and result types
//! - Bootstrap configuration loading
//! - Playlist and track models as they appear on the wire

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{Playlist, PlaylistSummary, Track};
