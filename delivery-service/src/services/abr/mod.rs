//! Adaptive bitrate engine
//!
//! Derives device capability limits from the client's user agent, tests
//! tier eligibility against those limits, and selects a quality from
//! bandwidth and buffer state. Confidence scoring for recommendations is a
//! pluggable policy hook, not part of the selection rules.

use crate::services::catalog::{Codec, QualityTier};

/// Quality labels offered to clients, lowest first
pub const QUALITY_LADDER: [&str; 4] = ["360p", "480p", "720p", "1080p"];

/// Capability limits derived from a client signal
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCapabilities {
    pub max_width: u32,
    pub max_height: u32,
    pub max_bitrate_bps: u64,
    pub supported_codecs: Vec<Codec>,
    pub supports_hdr: bool,
    pub supports_60fps: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            max_bitrate_bps: 5_000_000,
            supported_codecs: vec![Codec::H264, Codec::Vp9, Codec::Av1],
            supports_hdr: false,
            supports_60fps: true,
        }
    }
}

/// Derive capability limits from the user agent
///
/// Decision table, first match wins on top of the base default: "Mobile"
/// caps at 720p/2Mbps, otherwise "4K"/"UHD" raises to 2160p/25Mbps with
/// HDR. A missing or empty user agent keeps the default.
pub fn analyze_device_capabilities(user_agent: Option<&str>) -> DeviceCapabilities {
    let mut caps = DeviceCapabilities::default();

    let Some(ua) = user_agent.filter(|ua| !ua.is_empty()) else {
        return caps;
    };

    if ua.contains("Mobile") {
        caps.max_width = 1280;
        caps.max_height = 720;
        caps.max_bitrate_bps = 2_000_000;
    } else if ua.contains("4K") || ua.contains("UHD") {
        caps.max_width = 3840;
        caps.max_height = 2160;
        caps.max_bitrate_bps = 25_000_000;
        caps.supports_hdr = true;
    }

    caps
}

/// Whether a tier fits within the device limits
pub fn is_quality_supported(tier: &QualityTier, caps: &DeviceCapabilities) -> bool {
    tier.width <= caps.max_width
        && tier.height <= caps.max_height
        && tier.bitrate_bps <= caps.max_bitrate_bps
        && caps.supported_codecs.contains(&tier.codec)
}

/// Select a quality label from bandwidth estimate and buffer level
///
/// Rules are evaluated in order; a starved buffer on a slow link drops to
/// the floor tier before the bandwidth ladder applies.
pub fn select_quality(bandwidth_estimate_bps: u64, buffer_level_seconds: f64) -> &'static str {
    if buffer_level_seconds < 10.0 && bandwidth_estimate_bps < 2_000_000 {
        "360p"
    } else if bandwidth_estimate_bps > 5_000_000 {
        "1080p"
    } else if bandwidth_estimate_bps > 2_500_000 {
        "720p"
    } else {
        "480p"
    }
}

/// A quality recommendation with scoring metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub quality: String,
    pub alternatives: Vec<String>,
    pub confidence: f32,
    pub reason_code: String,
}

/// Policy hook producing confidence and reason for a recommendation
///
/// Swappable per deployment; the selection itself is not negotiable, only
/// the scoring metadata attached to it.
pub trait RecommendationScorer: Send + Sync {
    fn score(&self, bandwidth_estimate_bps: u64, buffer_level_seconds: f64) -> (f32, String);
}

/// Default scorer: constant confidence, fixed reason code
pub struct DefaultScorer;

impl RecommendationScorer for DefaultScorer {
    fn score(&self, _bandwidth_estimate_bps: u64, _buffer_level_seconds: f64) -> (f32, String) {
        (0.85, "bandwidth_buffer_heuristic".to_string())
    }
}

/// Recommend a quality for the given network/buffer state
pub fn recommend(
    bandwidth_estimate_bps: u64,
    buffer_level_seconds: f64,
    scorer: &dyn RecommendationScorer,
) -> Recommendation {
    let quality = select_quality(bandwidth_estimate_bps, buffer_level_seconds);
    let (confidence, reason_code) = scorer.score(bandwidth_estimate_bps, buffer_level_seconds);

    Recommendation {
        quality: quality.to_string(),
        alternatives: QUALITY_LADDER.iter().map(|q| q.to_string()).collect(),
        confidence,
        reason_code,
    }
}
