//! Preload scheduling
//!
//! Expands a preload strategy into prioritized, addressed segment
//! requests plus advisory cache instructions. Ordering is a contract:
//! offset ascending first, then the caller-supplied quality order, so a
//! client draining the list top-down always fetches the nearest segments
//! first.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Advisory cache lifetime attached to preload instructions
pub const CACHE_DURATION_SECONDS: u64 = 3600;

/// Fetch priority for a preloaded segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// How far ahead and at which qualities to preload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PreloadStrategy {
    /// Number of upcoming segments to schedule
    pub segment_count: u32,
    /// Quality labels in fetch-preference order
    pub quality_levels: Vec<String>,
    /// Priority assigned beyond the first offset
    pub default_priority: Priority,
    /// Client-side buffer ceiling in seconds
    pub max_buffer_seconds: u32,
}

/// A fully addressed preload request for one segment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SegmentAddress {
    pub title_id: String,
    pub quality: String,
    pub segment_index: u64,
    pub url: String,
    pub priority: Priority,
    pub estimated_bytes: u64,
}

/// Advisory cache instruction for one preloaded segment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CacheInstruction {
    pub url: String,
    pub priority: Priority,
    pub cache_duration_seconds: u64,
}

/// Estimated bytes for a 10s segment at a quality label
pub fn estimated_segment_bytes(quality: &str) -> u64 {
    match quality {
        "360p" => 500_000,
        "480p" => 800_000,
        "720p" => 1_500_000,
        "1080p" => 3_000_000,
        _ => 1_000_000,
    }
}

/// Expand a strategy into addressed segment requests
///
/// For each offset from 1 to `segment_count`, one address per quality in
/// the strategy's order. The first offset is High priority, later offsets
/// Medium.
pub fn determine_preload_segments(
    title_id: &str,
    current_segment_index: u64,
    strategy: &PreloadStrategy,
) -> Vec<SegmentAddress> {
    let mut segments =
        Vec::with_capacity(strategy.segment_count as usize * strategy.quality_levels.len());

    for offset in 1..=strategy.segment_count as u64 {
        // Index is client-supplied; clamp instead of wrapping at the top.
        let index = current_segment_index.saturating_add(offset);
        let priority = if offset == 1 {
            Priority::High
        } else {
            Priority::Medium
        };

        for quality in &strategy.quality_levels {
            segments.push(SegmentAddress {
                title_id: title_id.to_string(),
                quality: quality.clone(),
                segment_index: index,
                url: format!("/segment/{}/{}/{}.ts", title_id, quality, index),
                priority,
                estimated_bytes: estimated_segment_bytes(quality),
            });
        }
    }

    segments
}

/// One advisory cache instruction per segment, order preserved
pub fn generate_cache_instructions(segments: &[SegmentAddress]) -> Vec<CacheInstruction> {
    segments
        .iter()
        .map(|segment| CacheInstruction {
            url: segment.url.clone(),
            priority: segment.priority,
            cache_duration_seconds: CACHE_DURATION_SECONDS,
        })
        .collect()
}
