/// OpenAPI documentation for the Delivery Service
use utoipa::OpenApi;

use crate::models;
use crate::services::analytics::PlaybackStats;
use crate::services::preload::{CacheInstruction, PreloadStrategy, Priority, SegmentAddress};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Delivery Service API",
        version = "1.0.0",
        description = "Adaptive bitrate video delivery. Serves HLS master and variant playlists, range-aware throttled segment delivery, live chunk delivery with catch-up redirection, quality recommendations, preload scheduling, playback analytics intake, and storyboard sprites.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8085", description = "Development server"),
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "manifests", description = "HLS master and variant playlists"),
        (name = "delivery", description = "Segment, progressive, and live byte delivery"),
        (name = "quality", description = "Adaptive bitrate recommendations"),
        (name = "preload", description = "Segment preload scheduling"),
        (name = "analytics", description = "Playback stats reporting"),
        (name = "thumbnails", description = "Storyboard sprites for scrub preview"),
    ),
    components(schemas(
        models::QualityRecommendationRequest,
        models::QualityRecommendations,
        models::PlaybackStatsRequest,
        models::PlaybackAck,
        models::PreloadRequest,
        models::PreloadResponse,
        PlaybackStats,
        PreloadStrategy,
        SegmentAddress,
        CacheInstruction,
        Priority,
    ))
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn title() -> &'static str {
        "Delivery Service"
    }

    pub fn version() -> &'static str {
        "1.0.0"
    }
}
