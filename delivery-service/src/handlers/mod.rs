/// HTTP handlers for delivery endpoints
///
/// This module contains handlers for:
/// - Manifests: master and variant playlist synthesis
/// - Segments: range-aware throttled byte delivery (`/segment`, `/watch`)
/// - Live: live chunk delivery with catch-up redirection
/// - Quality: ABR recommendations
/// - Preload: segment preload scheduling
/// - Analytics: playback stats reporting
/// - Thumbnails: storyboard sprites for scrub preview
pub mod analytics;
pub mod live;
pub mod manifest;
pub mod preload;
pub mod quality;
pub mod segments;
pub mod thumbnails;

// Explicit re-exports to avoid ambiguity
pub use analytics::report_playback;
pub use live::get_live_chunk;
pub use manifest::{get_master_playlist, get_variant_playlist};
pub use preload::preload_segments;
pub use quality::recommend_quality;
pub use segments::{get_segment, watch};
pub use thumbnails::get_storyboard;
