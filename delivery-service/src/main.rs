/// Delivery Service - HTTP Server
///
/// Serves playlists, segments, live chunks, and the delivery-adjacent
/// JSON surfaces. Media files come from the external processing pipeline
/// under the configured media root.
use actix_web::{middleware as actix_middleware, web, App, HttpResponse, HttpServer};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use delivery_service::cache::DeliveryCache;
use delivery_service::handlers;
use delivery_service::metrics;
use delivery_service::middleware::MetricsMiddleware;
use delivery_service::services::abr::{DefaultScorer, RecommendationScorer};
use delivery_service::services::access::{AccessValidator, TokenValidator};
use delivery_service::services::analytics::SessionStatsStore;
use delivery_service::services::catalog::{MediaStore, StaticCatalog, VideoCatalog};
use delivery_service::services::streaming::{PlaylistBuilder, PlaylistConfig};
use delivery_service::Config;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    let bind_address = format!("{}:{}", config.app.host, config.app.port);

    tracing::info!("Delivery Service starting HTTP server on {}", bind_address);

    let catalog: Arc<dyn VideoCatalog> = Arc::new(StaticCatalog::new(
        config.media.root.clone(),
        config.media.default_duration_seconds,
    ));
    let catalog = web::Data::new(catalog);
    let store = web::Data::new(MediaStore::new(config.media.root.clone()));
    let builder = web::Data::new(PlaylistBuilder::new(PlaylistConfig {
        segment_duration_seconds: config.media.segment_duration_seconds,
    }));
    let cache = web::Data::new(DeliveryCache::new(
        Duration::from_secs(config.cache.playlist_ttl_seconds),
        Duration::from_secs(config.cache.storyboard_ttl_seconds),
    ));
    let stats = web::Data::new(SessionStatsStore::new());
    let scorer: Arc<dyn RecommendationScorer> = Arc::new(DefaultScorer);
    let scorer = web::Data::new(scorer);
    let access: Arc<dyn AccessValidator> =
        Arc::new(TokenValidator::new(config.delivery.segment_token_required));
    let access = web::Data::new(access);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(catalog.clone())
            .app_data(store.clone())
            .app_data(builder.clone())
            .app_data(cache.clone())
            .app_data(stats.clone())
            .app_data(scorer.clone())
            .app_data(access.clone())
            .wrap(actix_middleware::Logger::default())
            .wrap(MetricsMiddleware)
            .route(
                "/api/v1/health",
                web::get()
                    .to(|| async { HttpResponse::Ok().json(serde_json::json!({"status": "ok"})) }),
            )
            .route(
                "/api/v1/health/ready",
                web::get().to(|| async { HttpResponse::Ok().finish() }),
            )
            .route(
                "/api/v1/health/live",
                web::get().to(|| async { HttpResponse::Ok().finish() }),
            )
            .route(
                "/api/v1/openapi.json",
                web::get().to(|| async {
                    use utoipa::OpenApi;
                    HttpResponse::Ok()
                        .content_type("application/json")
                        .json(delivery_service::openapi::ApiDoc::openapi())
                }),
            )
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .route(
                "/manifest/{title_id}.m3u8",
                web::get().to(handlers::get_master_playlist),
            )
            .route(
                "/playlist/{title_id}/{quality}.m3u8",
                web::get().to(handlers::get_variant_playlist),
            )
            .route(
                "/segment/{title_id}/{quality}/{index}.ts",
                web::get().to(handlers::get_segment),
            )
            .route("/watch", web::get().to(handlers::watch))
            .route(
                "/quality/recommend",
                web::post().to(handlers::recommend_quality),
            )
            .route(
                "/analytics/playback",
                web::post().to(handlers::report_playback),
            )
            .route(
                "/live/{stream_id}/chunk",
                web::get().to(handlers::get_live_chunk),
            )
            .route(
                "/preload/segments",
                web::post().to(handlers::preload_segments),
            )
            .route(
                "/thumbnails/{title_id}/storyboard",
                web::get().to(handlers::get_storyboard),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
