/// Service layer for adaptive delivery
///
/// This module provides the algorithmic core behind the HTTP surface:
/// - delivery: byte-range resolution and throttled chunked streaming
/// - abr: device capability analysis and quality selection
/// - streaming: master/variant playlist synthesis
/// - live: live-edge sequencing, catch-up, and bounded chunk waits
/// - preload: preload expansion and cache instructions
/// - format: tag-based format addressing for the watch surface
/// - catalog: title metadata and pipeline file addressing
/// - analytics: per-session playback stats (last writer wins)
/// - access: token acceptance seam for segment delivery
pub mod abr;
pub mod access;
pub mod analytics;
pub mod catalog;
pub mod delivery;
pub mod format;
pub mod live;
pub mod preload;
pub mod streaming;
