//! Playlist Synthesis Module
//!
//! Builds the two HLS text artifacts the delivery surface serves:
//!
//! - Master playlists: capability-filtered, codec-narrowed, bitrate-sorted
//!   tier listings
//! - Variant playlists: per-tier segment enumerations with optional start
//!   offset
//!
//! ## NOT in Scope
//!
//! Live chunk sequencing and catch-up belong to `services::live`; this
//! module only produces VOD text (live variants never carry the ENDLIST
//! terminator and are assembled by the live coordinator's caller).

pub mod manifest;

// Re-export commonly used types
pub use manifest::{PlaylistBuilder, PlaylistConfig};
