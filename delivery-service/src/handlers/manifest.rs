/// Manifest handlers - master and variant playlist endpoints
use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::cache::DeliveryCache;
use crate::error::{AppError, Result};
use crate::services::abr::{analyze_device_capabilities, DeviceCapabilities};
use crate::services::catalog::{is_valid_media_id, Codec, VideoCatalog};
use crate::services::streaming::PlaylistBuilder;

const PLAYLIST_MIME: &str = "application/vnd.apple.mpegurl";
const PLAYLIST_CACHE_CONTROL: &str = "max-age=300";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterPlaylistQuery {
    pub preferred_codec: Option<String>,
    pub auto_quality: Option<bool>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantPlaylistQuery {
    pub start_time: Option<f64>,
    pub segment_duration: Option<u32>,
}

/// GET /manifest/{title_id}.m3u8
pub async fn get_master_playlist(
    title_id: web::Path<String>,
    query: web::Query<MasterPlaylistQuery>,
    req: HttpRequest,
    catalog: web::Data<Arc<dyn VideoCatalog>>,
    builder: web::Data<PlaylistBuilder>,
    cache: web::Data<DeliveryCache>,
) -> Result<HttpResponse> {
    let title_id = title_id.into_inner();
    if !is_valid_media_id(&title_id) {
        return Err(AppError::BadRequest("Invalid title ID".to_string()));
    }

    let preferred_codec = match query.preferred_codec.as_deref() {
        Some(raw) => Some(
            Codec::parse(raw)
                .ok_or_else(|| AppError::ValidationError(format!("Unknown codec: {raw}")))?,
        ),
        None => None,
    };

    // Query userAgent wins over the transport header; players proxying
    // through a CDN forward the original agent in the query.
    let user_agent = query.user_agent.clone().or_else(|| {
        req.headers()
            .get("User-Agent")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    });

    // autoQuality=false serves the full ladder for manual selection.
    let auto_quality = query.auto_quality.unwrap_or(true);
    let caps = if auto_quality {
        analyze_device_capabilities(user_agent.as_deref())
    } else {
        DeviceCapabilities {
            max_width: u32::MAX,
            max_height: u32::MAX,
            max_bitrate_bps: u64::MAX,
            ..DeviceCapabilities::default()
        }
    };

    let codec_label = preferred_codec.map(|c| c.as_str()).unwrap_or("any");
    let class = if auto_quality {
        capability_class(&caps)
    } else {
        "all"
    };
    let cache_key = DeliveryCache::master_playlist_key(&title_id, codec_label, class);
    if let Some(cached) = cache.get_playlist(&cache_key).await {
        return Ok(playlist_response(cached));
    }

    let tiers = catalog
        .tiers(&title_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Title not found: {title_id}")))?;

    let playlist = builder.build_master_playlist(&title_id, &tiers, &caps, preferred_codec);
    cache.cache_playlist(cache_key, playlist.clone()).await;

    Ok(playlist_response(playlist))
}

/// GET /playlist/{title_id}/{quality}.m3u8
pub async fn get_variant_playlist(
    path: web::Path<(String, String)>,
    query: web::Query<VariantPlaylistQuery>,
    catalog: web::Data<Arc<dyn VideoCatalog>>,
    builder: web::Data<PlaylistBuilder>,
    cache: web::Data<DeliveryCache>,
) -> Result<HttpResponse> {
    let (title_id, quality) = path.into_inner();
    if !is_valid_media_id(&title_id) || !is_valid_media_id(&quality) {
        return Err(AppError::BadRequest("Invalid title or quality".to_string()));
    }

    let segment_duration = query
        .segment_duration
        .filter(|d| *d > 0)
        .unwrap_or_else(|| builder.segment_duration_seconds());
    let start_segment = query
        .start_time
        .map(|offset| (offset.max(0.0) / segment_duration as f64).floor() as u64)
        .unwrap_or(0);

    let cache_key = DeliveryCache::variant_playlist_key(&title_id, &quality, start_segment, segment_duration);
    if let Some(cached) = cache.get_playlist(&cache_key).await {
        return Ok(playlist_response(cached));
    }

    let tiers = catalog
        .tiers(&title_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Title not found: {title_id}")))?;
    let tier = tiers
        .iter()
        .find(|t| t.label == quality)
        .ok_or_else(|| AppError::NotFound(format!("Unknown quality: {quality}")))?;

    let playlist = builder.build_variant_playlist(
        &title_id,
        tier,
        query.start_time,
        query.segment_duration,
    );
    cache.cache_playlist(cache_key, playlist.clone()).await;

    Ok(playlist_response(playlist))
}

fn playlist_response(playlist: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(PLAYLIST_MIME)
        .insert_header(("Cache-Control", PLAYLIST_CACHE_CONTROL))
        .body(playlist)
}

fn capability_class(caps: &DeviceCapabilities) -> &'static str {
    match caps.max_width {
        w if w <= 1280 => "mobile",
        w if w >= 3840 => "uhd",
        _ => "default",
    }
}
