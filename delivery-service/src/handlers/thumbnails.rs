/// Storyboard delivery for scrub preview
///
/// Serves the sprite sheet the processing pipeline wrote for a title.
/// When the pipeline has not produced one, a neutral placeholder grid is
/// synthesized so players always get a decodable image. Results are
/// cached in-process for an hour either way.
use std::io::Cursor;
use std::sync::Arc;

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use bytes::Bytes;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use serde::Deserialize;
use tracing::debug;

use crate::cache::DeliveryCache;
use crate::error::{AppError, Result};
use crate::services::catalog::{is_valid_media_id, MediaStore, VideoCatalog};

const STORYBOARD_CACHE_CONTROL: &str = "public, max-age=3600";

const TILE_WIDTH: u32 = 160;
const TILE_HEIGHT: u32 = 90;

#[derive(Debug, Deserialize)]
pub struct StoryboardQuery {
    /// Zoom level; higher levels carry more, smaller tiles
    pub level: Option<u32>,
    /// `jpg` or `png`
    pub format: Option<String>,
}

/// GET /thumbnails/{title_id}/storyboard
pub async fn get_storyboard(
    title_id: web::Path<String>,
    query: web::Query<StoryboardQuery>,
    catalog: web::Data<Arc<dyn VideoCatalog>>,
    store: web::Data<MediaStore>,
    cache: web::Data<DeliveryCache>,
) -> Result<HttpResponse> {
    let title_id = title_id.into_inner();
    if !is_valid_media_id(&title_id) {
        return Err(AppError::BadRequest("Invalid title ID".to_string()));
    }

    let level = query.level.unwrap_or(1);
    let format = match query.format.as_deref().unwrap_or("jpg") {
        "jpg" | "jpeg" => "jpg",
        "png" => "png",
        other => {
            return Err(AppError::ValidationError(format!(
                "Unsupported storyboard format: {other}"
            )))
        }
    };

    if catalog.tiers(&title_id).await.is_none() {
        return Err(AppError::NotFound(format!("Title not found: {title_id}")));
    }

    let cache_key = DeliveryCache::storyboard_key(&title_id, level, format);
    if let Some(cached) = cache.get_storyboard(&cache_key).await {
        return Ok(storyboard_response(cached, format));
    }

    let path = store.storyboard_path(&title_id, level, format);
    let image = match tokio::fs::read(&path).await {
        Ok(bytes) => Bytes::from(bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(%title_id, level, "no pipeline storyboard, synthesizing placeholder");
            placeholder_storyboard(level, format)?
        }
        Err(err) => return Err(err.into()),
    };

    cache.cache_storyboard(cache_key, image.clone()).await;

    Ok(storyboard_response(image, format))
}

fn storyboard_response(image: Bytes, format: &str) -> HttpResponse {
    let mime = if format == "png" {
        "image/png"
    } else {
        "image/jpeg"
    };
    HttpResponse::Ok()
        .content_type(mime)
        .insert_header((header::CACHE_CONTROL, STORYBOARD_CACHE_CONTROL))
        .body(image)
}

/// Neutral tile grid matching the pipeline sprite geometry
fn placeholder_storyboard(level: u32, format: &str) -> Result<Bytes> {
    let tiles_per_side = (4 + level).min(10);
    let width = TILE_WIDTH * tiles_per_side;
    let height = TILE_HEIGHT * tiles_per_side;

    let mut sprite = RgbImage::from_pixel(width, height, Rgb([24, 24, 24]));
    for x in (0..width).step_by(TILE_WIDTH as usize) {
        for y in 0..height {
            sprite.put_pixel(x, y, Rgb([64, 64, 64]));
        }
    }
    for y in (0..height).step_by(TILE_HEIGHT as usize) {
        for x in 0..width {
            sprite.put_pixel(x, y, Rgb([64, 64, 64]));
        }
    }

    let output_format = if format == "png" {
        ImageOutputFormat::Png
    } else {
        ImageOutputFormat::Jpeg(80)
    };

    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(sprite)
        .write_to(&mut Cursor::new(&mut buffer), output_format)
        .map_err(|e| AppError::Internal(format!("storyboard encode failed: {e}")))?;

    Ok(Bytes::from(buffer))
}
