/// Segment and progressive delivery - the range-aware byte surfaces
///
/// Both endpoints resolve a target file, negotiate an HTTP byte range
/// against its length, and hand delivery to the throttled chunk stream.
/// A `Range` header that resolves to nothing is answered 416 with the
/// resource extent; only the first resolved range is served.
use std::sync::Arc;

use actix_web::body::SizedStream;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::services::access::AccessValidator;
use crate::services::catalog::{is_valid_media_id, MediaStore, VideoCatalog};
use crate::services::delivery::{open_throttled, resolve_byte_ranges, ByteRange, ThrottlePolicy};
use crate::services::format::{select_format, tier_for_format};

const SEGMENT_MIME: &str = "video/mp2t";
const SEGMENT_CACHE_CONTROL: &str = "public, max-age=86400, immutable";

#[derive(Debug, Deserialize)]
pub struct SegmentQuery {
    pub token: Option<String>,
    /// Client marks prefetch traffic; delivery is identical either way
    pub preload: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct WatchQuery {
    /// Title id
    pub v: String,
    pub itag: Option<u32>,
    pub mime: Option<String>,
    /// Query-string range spec, `start-end` without the `bytes=` prefix
    pub range: Option<String>,
    /// Segment sequence; absent means progressive whole-file delivery
    pub sq: Option<u64>,
    /// Accepted and never consulted; TLS is terminated upstream
    #[allow(dead_code)]
    pub requiressl: Option<String>,
}

/// GET /segment/{title_id}/{quality}/{index}.ts
pub async fn get_segment(
    path: web::Path<(String, String, u64)>,
    query: web::Query<SegmentQuery>,
    req: HttpRequest,
    config: web::Data<Config>,
    store: web::Data<MediaStore>,
    access: web::Data<Arc<dyn AccessValidator>>,
) -> Result<HttpResponse> {
    let (title_id, quality, index) = path.into_inner();
    if !is_valid_media_id(&title_id) || !is_valid_media_id(&quality) {
        return Err(AppError::BadRequest("Invalid title or quality".to_string()));
    }

    if !access.validate(query.token.as_deref()) {
        return Err(AppError::Unauthorized("Invalid segment token".to_string()));
    }

    if query.preload.unwrap_or(false) {
        debug!(%title_id, %quality, index, "prefetch segment request");
    }

    let segment_path = store.segment_path(&title_id, &quality, index);
    let length = store
        .resource_length(&segment_path)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Segment not found: {title_id}/{quality}/{index}"))
        })?;

    metrics::observe_segment_served(&quality);

    let range_header = req
        .headers()
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok());

    deliver_file(
        &segment_path,
        length,
        range_header,
        SEGMENT_MIME,
        delivery_policy(&config),
    )
    .await
}

/// GET /watch
///
/// Tag-addressed delivery over the same tiers the playlists expose. With
/// `sq` the target is one segment; without, the progressive file for the
/// selected format's container.
pub async fn watch(
    query: web::Query<WatchQuery>,
    req: HttpRequest,
    config: web::Data<Config>,
    catalog: web::Data<Arc<dyn VideoCatalog>>,
    store: web::Data<MediaStore>,
) -> Result<HttpResponse> {
    let title_id = &query.v;
    if !is_valid_media_id(title_id) {
        return Err(AppError::BadRequest("Invalid title ID".to_string()));
    }

    let tiers = catalog
        .tiers(title_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Title not found: {title_id}")))?;

    let format = select_format(query.itag, query.mime.as_deref(), &tiers)
        .map_err(|err| AppError::FormatUnavailable(err.to_string()))?;
    let tier = tier_for_format(format, &tiers)
        .ok_or_else(|| AppError::NotFound(format!("No tier for tag {}", format.tag)))?;

    let target = match query.sq {
        Some(sequence) => store.segment_path(title_id, &tier.label, sequence),
        None => store.progressive_path(title_id, &tier.label, format.container),
    };
    let length = store.resource_length(&target).await?.ok_or_else(|| {
        AppError::NotFound(format!("Media not found: {title_id}/{}", tier.label))
    })?;

    if query.sq.is_some() {
        metrics::observe_segment_served(&tier.label);
    }

    // Query range spec wins over the header; it carries the same grammar
    // minus the unit prefix.
    let normalized;
    let range_spec = match query.range.as_deref() {
        Some(spec) => {
            normalized = format!("bytes={}", spec);
            Some(normalized.as_str())
        }
        None => req
            .headers()
            .get(header::RANGE)
            .and_then(|v| v.to_str().ok()),
    };

    deliver_file(
        &target,
        length,
        range_spec,
        format.mime_type,
        delivery_policy(&config),
    )
    .await
}

fn delivery_policy(config: &Config) -> ThrottlePolicy {
    ThrottlePolicy {
        bandwidth_limit_bps: config.delivery.bandwidth_limit_bps,
        chunk_size: config.delivery.chunk_size_bytes.max(1),
    }
}

/// Range-negotiated file delivery shared by the byte surfaces
async fn deliver_file(
    path: &std::path::Path,
    length: u64,
    range_spec: Option<&str>,
    mime: &str,
    policy: ThrottlePolicy,
) -> Result<HttpResponse> {
    // Dropping the response body cancels the stream; the token exists so
    // the delivery loop has an explicit cooperative stop signal too.
    let cancel = CancellationToken::new();

    if let Some(spec) = range_spec {
        let ranges = resolve_byte_ranges(spec, length);
        let Some(range) = ranges.first().copied() else {
            // 416 carries the resource extent so the client can retry.
            let err = AppError::RangeNotSatisfiable(format!("No satisfiable range in {spec:?}"));
            let mut response = err.error_response();
            let extent = header::HeaderValue::from_str(&format!("bytes */{}", length))
                .map_err(|e| AppError::Internal(e.to_string()))?;
            response.headers_mut().insert(header::CONTENT_RANGE, extent);
            return Ok(response);
        };

        let stream = open_throttled(path, range, policy, cancel).await?;
        return Ok(HttpResponse::PartialContent()
            .content_type(mime)
            .insert_header((header::CONTENT_RANGE, range.content_range(length)))
            .insert_header((header::ACCEPT_RANGES, "bytes"))
            .insert_header((header::CACHE_CONTROL, SEGMENT_CACHE_CONTROL))
            .body(SizedStream::new(range.len(), stream)));
    }

    match ByteRange::whole(length) {
        Some(range) => {
            let stream = open_throttled(path, range, policy, cancel).await?;
            Ok(HttpResponse::Ok()
                .content_type(mime)
                .insert_header((header::ACCEPT_RANGES, "bytes"))
                .insert_header((header::CACHE_CONTROL, SEGMENT_CACHE_CONTROL))
                .body(SizedStream::new(range.len(), stream)))
        }
        // Zero-length file: nothing to stream, headers still apply.
        None => Ok(HttpResponse::Ok()
            .content_type(mime)
            .insert_header((header::ACCEPT_RANGES, "bytes"))
            .insert_header((header::CACHE_CONTROL, SEGMENT_CACHE_CONTROL))
            .finish()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    use crate::config::{
        AppConfig, CacheConfig, DeliveryConfig, LiveConfig, MediaConfig,
    };
    use crate::services::access::TokenValidator;
    use crate::services::catalog::StaticCatalog;

    fn test_config(root: &std::path::Path, token_required: bool) -> Config {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                env: "test".to_string(),
            },
            media: MediaConfig {
                root: root.to_path_buf(),
                segment_duration_seconds: 10,
                default_duration_seconds: 60.0,
            },
            delivery: DeliveryConfig {
                bandwidth_limit_bps: 0,
                chunk_size_bytes: 64 * 1024,
                segment_token_required: token_required,
            },
            live: LiveConfig {
                segment_duration_seconds: 2,
                chunk_poll_interval_ms: 10,
                chunk_timeout_ms: 50,
            },
            cache: CacheConfig {
                playlist_ttl_seconds: 300,
                storyboard_ttl_seconds: 3600,
            },
        }
    }

    async fn segment_app(
        root: &std::path::Path,
        token_required: bool,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        let config = test_config(root, token_required);
        let access: Arc<dyn AccessValidator> = Arc::new(TokenValidator::new(token_required));
        let catalog: Arc<dyn VideoCatalog> =
            Arc::new(StaticCatalog::new(root.to_path_buf(), 60.0));

        test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(MediaStore::new(root.to_path_buf())))
                .app_data(web::Data::new(access))
                .app_data(web::Data::new(catalog))
                .route(
                    "/segment/{title_id}/{quality}/{index}.ts",
                    web::get().to(get_segment),
                )
                .route("/watch", web::get().to(watch)),
        )
        .await
    }

    fn seed_segment(root: &std::path::Path, bytes: usize) {
        let dir = root.join("title1").join("720p");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("segment_000000.ts"), vec![7u8; bytes]).unwrap();
    }

    #[actix_web::test]
    async fn test_segment_whole_file_is_200() {
        let tmp = tempfile::tempdir().unwrap();
        seed_segment(tmp.path(), 1000);
        let app = segment_app(tmp.path(), false).await;

        let req = test::TestRequest::get()
            .uri("/segment/title1/720p/0.ts")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "video/mp2t"
        );
        let body = test::read_body(resp).await;
        assert_eq!(body.len(), 1000);
    }

    #[actix_web::test]
    async fn test_segment_range_is_206_with_content_range() {
        let tmp = tempfile::tempdir().unwrap();
        seed_segment(tmp.path(), 1000);
        let app = segment_app(tmp.path(), false).await;

        let req = test::TestRequest::get()
            .uri("/segment/title1/720p/0.ts")
            .insert_header((header::RANGE, "bytes=0-499"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(
            resp.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes 0-499/1000"
        );
        let body = test::read_body(resp).await;
        assert_eq!(body.len(), 500);
    }

    #[actix_web::test]
    async fn test_unsatisfiable_range_is_416_with_extent() {
        let tmp = tempfile::tempdir().unwrap();
        seed_segment(tmp.path(), 1000);
        let app = segment_app(tmp.path(), false).await;

        let req = test::TestRequest::get()
            .uri("/segment/title1/720p/0.ts")
            .insert_header((header::RANGE, "bytes=1000-2000"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 416);
        assert_eq!(
            resp.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes */1000"
        );
    }

    #[actix_web::test]
    async fn test_missing_segment_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let app = segment_app(tmp.path(), false).await;

        let req = test::TestRequest::get()
            .uri("/segment/title1/720p/0.ts")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_required_token_rejects_missing() {
        let tmp = tempfile::tempdir().unwrap();
        seed_segment(tmp.path(), 100);
        let app = segment_app(tmp.path(), true).await;

        let denied = test::TestRequest::get()
            .uri("/segment/title1/720p/0.ts")
            .to_request();
        assert_eq!(test::call_service(&app, denied).await.status(), 401);

        let allowed = test::TestRequest::get()
            .uri("/segment/title1/720p/0.ts?token=abc")
            .to_request();
        assert_eq!(test::call_service(&app, allowed).await.status(), 200);
    }

    #[actix_web::test]
    async fn test_watch_unknown_title_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let app = segment_app(tmp.path(), false).await;

        let req = test::TestRequest::get()
            .uri("/watch?v=missing&itag=22")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_watch_serves_segment_by_sequence() {
        let tmp = tempfile::tempdir().unwrap();
        seed_segment(tmp.path(), 256);
        let app = segment_app(tmp.path(), false).await;

        let req = test::TestRequest::get()
            .uri("/watch?v=title1&itag=22&sq=0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "video/mp4"
        );
        assert_eq!(test::read_body(resp).await.len(), 256);
    }

    #[actix_web::test]
    async fn test_watch_query_range_wins() {
        let tmp = tempfile::tempdir().unwrap();
        seed_segment(tmp.path(), 1000);
        let app = segment_app(tmp.path(), false).await;

        let req = test::TestRequest::get()
            .uri("/watch?v=title1&itag=22&sq=0&range=100-199")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(
            resp.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes 100-199/1000"
        );
    }
}
