/// Data models for delivery-service
///
/// This module defines request/response structures for:
/// - Quality recommendation (ABR)
/// - Playback analytics reporting
/// - Preload scheduling
///
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::services::analytics::PlaybackStats;
use crate::services::preload::{CacheInstruction, PreloadStrategy, SegmentAddress};

// ========================================
// Quality Recommendation Models
// ========================================

/// Client state submitted for a quality recommendation
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct QualityRecommendationRequest {
    #[validate(length(min = 1, max = 128))]
    pub session_id: Option<String>,
    /// Measured network throughput in bits/sec
    pub bandwidth_estimate_bps: u64,
    /// Seconds of media currently buffered
    pub buffer_level_seconds: f64,
    pub user_agent: Option<String>,
}

/// Recommended quality plus scoring metadata
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QualityRecommendations {
    pub recommended_quality: String,
    /// Full quality ladder, lowest first
    pub alternatives: Vec<String>,
    /// Scorer confidence in [0, 1]
    pub confidence: f32,
    pub reason_code: String,
}

// ========================================
// Playback Analytics Models
// ========================================

/// Playback stats reported by a client session
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PlaybackStatsRequest {
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    pub title_id: Option<String>,
    pub current_quality: Option<String>,
    pub bandwidth_estimate_bps: Option<u64>,
    pub buffer_level_seconds: Option<f64>,
    pub playback_position_seconds: Option<f64>,
    pub dropped_frames: Option<u64>,
}

impl From<PlaybackStatsRequest> for PlaybackStats {
    fn from(req: PlaybackStatsRequest) -> Self {
        PlaybackStats {
            session_id: req.session_id,
            title_id: req.title_id,
            current_quality: req.current_quality,
            bandwidth_estimate_bps: req.bandwidth_estimate_bps,
            buffer_level_seconds: req.buffer_level_seconds,
            playback_position_seconds: req.playback_position_seconds,
            dropped_frames: req.dropped_frames,
            reported_at: Utc::now(),
        }
    }
}

/// Acknowledgement for a recorded playback report
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlaybackAck {
    pub status: String,
    pub recorded_at: DateTime<Utc>,
}

// ========================================
// Preload Models
// ========================================

/// Preload scheduling request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PreloadRequest {
    #[validate(length(min = 1, max = 128))]
    pub title_id: String,
    /// Segment the client is currently playing
    pub current_segment_index: u64,
    /// How many segments ahead to schedule; defaults to 3
    pub segment_count: Option<u32>,
    /// Explicit quality order; derived from ABR state when omitted
    pub quality_levels: Option<Vec<String>>,
    pub bandwidth_estimate_bps: Option<u64>,
    pub buffer_level_seconds: Option<f64>,
}

/// Scheduled preloads plus the strategy that produced them
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PreloadResponse {
    pub segments: Vec<SegmentAddress>,
    pub strategy: PreloadStrategy,
    pub cache_instructions: Vec<CacheInstruction>,
}
