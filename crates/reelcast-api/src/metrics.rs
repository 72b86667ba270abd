//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "reelcast_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "reelcast_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "reelcast_http_requests_in_flight";

    // Pipeline metrics
    pub const UPLOADS_TOTAL: &str = "reelcast_uploads_total";
    pub const RENDITIONS_TOTAL: &str = "reelcast_renditions_total";
    pub const PROCESSING_RUNS_TOTAL: &str = "reelcast_processing_runs_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "reelcast_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", normalize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an accepted upload.
pub fn record_upload(camera_format: &str) {
    let labels = [("camera_format", camera_format.to_string())];
    counter!(names::UPLOADS_TOTAL, &labels).increment(1);
}

/// Record one finished rendition attempt.
pub fn record_rendition(variant: &str, outcome: &str) {
    let labels = [
        ("variant", variant.to_string()),
        ("outcome", outcome.to_string()),
    ];
    counter!(names::RENDITIONS_TOTAL, &labels).increment(1);
}

/// Record one processing run reaching its end.
pub fn record_processing_run(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::PROCESSING_RUNS_TOTAL, &labels).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", normalize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Collapse per-file path segments so labels stay low-cardinality.
fn normalize_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("/api/upload/video/") {
        return match rest.split_once('/') {
            Some((_, tail)) => format!("/api/upload/video/:filename/{tail}"),
            None => "/api/upload/video/:filename".to_string(),
        };
    }
    if path.strip_prefix("/api/upload/files/").is_some() {
        return "/api/upload/files/:filename".to_string();
    }
    if let Some(rest) = path.strip_prefix("/uploads/") {
        return if rest.starts_with("processed/") {
            "/uploads/processed/:filename".to_string()
        } else {
            "/uploads/:filename".to_string()
        };
    }
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/api/upload/video/video-abc.mp4/status"),
            "/api/upload/video/:filename/status"
        );
        assert_eq!(
            normalize_path("/api/upload/video/video-abc.mp4"),
            "/api/upload/video/:filename"
        );
        assert_eq!(
            normalize_path("/api/upload/files/video-abc.mp4"),
            "/api/upload/files/:filename"
        );
        assert_eq!(
            normalize_path("/uploads/processed/video-abc_tiktok.mp4"),
            "/uploads/processed/:filename"
        );
        assert_eq!(normalize_path("/health"), "/health");
    }
}
