/// Playback analytics reporting endpoint
use actix_web::{web, HttpResponse};
use chrono::Utc;
use tracing::debug;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{PlaybackAck, PlaybackStatsRequest};
use crate::services::analytics::SessionStatsStore;

/// POST /analytics/playback
pub async fn report_playback(
    body: web::Json<PlaybackStatsRequest>,
    store: web::Data<SessionStatsStore>,
) -> Result<HttpResponse> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let request = body.into_inner();
    debug!(
        session_id = %request.session_id,
        quality = request.current_quality.as_deref(),
        "playback report"
    );

    store.record(request.into()).await;

    Ok(HttpResponse::Ok().json(PlaybackAck {
        status: "recorded".to_string(),
        recorded_at: Utc::now(),
    }))
}
