use std::time::Duration;

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, TextEncoder};

static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "delivery_service_http_requests_total",
            "Total HTTP requests handled by delivery-service",
        ),
        &["method", "path", "status"],
    )
    .expect("failed to create delivery_service_http_requests_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register delivery_service_http_requests_total");
    counter
});

static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        HistogramOpts::new(
            "delivery_service_http_request_duration_seconds",
            "HTTP request latency for delivery-service",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
        ]),
        &["method", "path", "status"],
    )
    .expect("failed to create delivery_service_http_request_duration_seconds");
    prometheus::default_registry()
        .register(Box::new(histogram.clone()))
        .expect("failed to register delivery_service_http_request_duration_seconds");
    histogram
});

static SEGMENTS_SERVED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "delivery_service_segments_served_total",
            "Segments delivered, by quality",
        ),
        &["quality"],
    )
    .expect("failed to create delivery_service_segments_served_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register delivery_service_segments_served_total");
    counter
});

static CATCHUP_REDIRECTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "delivery_service_catchup_redirects_total",
            "Live clients redirected toward the edge",
        ),
        &["stream"],
    )
    .expect("failed to create delivery_service_catchup_redirects_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register delivery_service_catchup_redirects_total");
    counter
});

pub fn observe_http_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    let status_label = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status_label])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path, &status_label])
        .observe(elapsed.as_secs_f64());
}

pub fn observe_segment_served(quality: &str) {
    SEGMENTS_SERVED_TOTAL.with_label_values(&[quality]).inc();
}

pub fn observe_catchup_redirect(stream_id: &str) {
    CATCHUP_REDIRECTS_TOTAL
        .with_label_values(&[stream_id])
        .inc();
}

pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
