/// Live chunk delivery with catch-up redirection
///
/// The requested sequence is compared against the wall-clock edge; a
/// client lagging more than the catch-up threshold is redirected forward
/// instead of being served a stale chunk. Chunks the pipeline has not
/// written yet are awaited with a bounded poll.
use std::time::Duration;

use actix_web::body::SizedStream;
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::services::catalog::{is_valid_media_id, MediaStore};
use crate::services::delivery::{open_throttled, ByteRange, ThrottlePolicy};
use crate::services::live::{await_chunk, catchup_target, current_sequence, ChunkWait};

const LIVE_MIME: &str = "video/mp2t";
const LIVE_CACHE_CONTROL: &str = "no-cache";

#[derive(Debug, Deserialize)]
pub struct LiveChunkQuery {
    /// Requested sequence; absent means the current edge
    pub seq: Option<u64>,
    pub quality: Option<String>,
}

/// GET /live/{stream_id}/chunk
pub async fn get_live_chunk(
    stream_id: web::Path<String>,
    query: web::Query<LiveChunkQuery>,
    config: web::Data<Config>,
    store: web::Data<MediaStore>,
) -> Result<HttpResponse> {
    let stream_id = stream_id.into_inner();
    if !is_valid_media_id(&stream_id) {
        return Err(AppError::BadRequest("Invalid stream ID".to_string()));
    }
    let quality = query
        .quality
        .clone()
        .ok_or_else(|| AppError::ValidationError("quality is required".to_string()))?;
    if !is_valid_media_id(&quality) {
        return Err(AppError::BadRequest("Invalid quality".to_string()));
    }

    let segment_duration = Duration::from_secs(config.live.segment_duration_seconds as u64);
    let current = current_sequence(segment_duration);
    let requested = query.seq.unwrap_or(current);

    if let Some(target) = catchup_target(current, requested, segment_duration) {
        info!(
            %stream_id,
            requested,
            current,
            target,
            "client behind the live edge, redirecting to catch-up sequence"
        );
        metrics::observe_catchup_redirect(&stream_id);
        let location = format!("/live/{stream_id}/chunk?seq={target}&quality={quality}");
        return Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, location))
            .finish());
    }

    let chunk_path = store.live_chunk_path(&stream_id, &quality, requested);
    let cancel = CancellationToken::new();

    let wait = await_chunk(
        &chunk_path,
        Duration::from_millis(config.live.chunk_poll_interval_ms),
        Duration::from_millis(config.live.chunk_timeout_ms),
        &cancel,
    )
    .await;

    match wait {
        ChunkWait::Ready => {}
        ChunkWait::TimedOut => {
            return Err(AppError::NotFound(format!(
                "Chunk not available: {stream_id}/{quality}/{requested}"
            )));
        }
        ChunkWait::Cancelled => {
            debug!(%stream_id, requested, "live chunk wait cancelled");
            return Ok(HttpResponse::NoContent().finish());
        }
    }

    // The file can still vanish between the probe and the open (pipeline
    // retention); treat that as not found, not an internal failure.
    let length = store
        .resource_length(&chunk_path)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Chunk not available: {stream_id}/{quality}/{requested}"
            ))
        })?;

    metrics::observe_segment_served(&quality);

    let policy = ThrottlePolicy {
        bandwidth_limit_bps: config.delivery.bandwidth_limit_bps,
        chunk_size: config.delivery.chunk_size_bytes.max(1),
    };

    match ByteRange::whole(length) {
        Some(range) => {
            let stream = open_throttled(&chunk_path, range, policy, cancel).await?;
            Ok(HttpResponse::Ok()
                .content_type(LIVE_MIME)
                .insert_header((header::CACHE_CONTROL, LIVE_CACHE_CONTROL))
                .body(SizedStream::new(range.len(), stream)))
        }
        None => Ok(HttpResponse::Ok()
            .content_type(LIVE_MIME)
            .insert_header((header::CACHE_CONTROL, LIVE_CACHE_CONTROL))
            .finish()),
    }
}
