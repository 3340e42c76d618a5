/// Preload scheduling endpoint
///
/// When the client does not pin a quality order, one is derived from its
/// reported bandwidth and buffer state: the selected quality first, then
/// the next tier down as fallback.
use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{PreloadRequest, PreloadResponse};
use crate::services::abr::{select_quality, QUALITY_LADDER};
use crate::services::catalog::is_valid_media_id;
use crate::services::preload::{
    determine_preload_segments, generate_cache_instructions, PreloadStrategy, Priority,
};

const DEFAULT_SEGMENT_COUNT: u32 = 3;
const DEFAULT_MAX_BUFFER_SECONDS: u32 = 30;

/// POST /preload/segments
pub async fn preload_segments(body: web::Json<PreloadRequest>) -> Result<HttpResponse> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let request = body.into_inner();
    if !is_valid_media_id(&request.title_id) {
        return Err(AppError::BadRequest("Invalid title ID".to_string()));
    }

    let quality_levels = match &request.quality_levels {
        Some(levels) if !levels.is_empty() => levels.clone(),
        _ => derived_quality_levels(
            request.bandwidth_estimate_bps.unwrap_or(2_000_000),
            request.buffer_level_seconds.unwrap_or(30.0),
        ),
    };

    let strategy = PreloadStrategy {
        segment_count: request.segment_count.unwrap_or(DEFAULT_SEGMENT_COUNT),
        quality_levels,
        default_priority: Priority::Medium,
        max_buffer_seconds: DEFAULT_MAX_BUFFER_SECONDS,
    };

    let segments =
        determine_preload_segments(&request.title_id, request.current_segment_index, &strategy);
    let cache_instructions = generate_cache_instructions(&segments);

    Ok(HttpResponse::Ok().json(PreloadResponse {
        segments,
        strategy,
        cache_instructions,
    }))
}

/// Selected quality first, then the adjacent lower tier as fallback
fn derived_quality_levels(bandwidth_estimate_bps: u64, buffer_level_seconds: f64) -> Vec<String> {
    let selected = select_quality(bandwidth_estimate_bps, buffer_level_seconds);
    let mut levels = vec![selected.to_string()];
    if let Some(position) = QUALITY_LADDER.iter().position(|q| *q == selected) {
        if position > 0 {
            levels.push(QUALITY_LADDER[position - 1].to_string());
        }
    }
    levels
}
