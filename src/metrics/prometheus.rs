//! Prometheus metrics definitions, request middleware and exposition handler

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use tracing::error;

lazy_static::lazy_static! {
    /// Total number of HTTP requests served
    pub static ref HTTP_REQUESTS: CounterVec = register_counter_vec!(
        "velero_dashboard_http_requests_total",
        "Total number of HTTP requests by route and status",
        &["method", "route", "status"]
    ).unwrap();

    /// HTTP request duration histogram
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "velero_dashboard_http_request_duration_seconds",
        "Duration of HTTP requests in seconds",
        &["method", "route"],
        vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    /// Total number of storage validations
    pub static ref STORAGE_VALIDATIONS: CounterVec = register_counter_vec!(
        "velero_dashboard_storage_validations_total",
        "Total number of storage validations by outcome",
        &["outcome"]
    ).unwrap();

    /// Total number of compensating resource modifier ConfigMap deletions
    pub static ref MODIFIER_CLEANUPS: CounterVec = register_counter_vec!(
        "velero_dashboard_modifier_cleanups_total",
        "Total number of resource modifier ConfigMap cleanups by outcome",
        &["outcome"]
    ).unwrap();
}

/// Route label for requests that matched no route
const UNMATCHED_ROUTE: &str = "unmatched";

/// Record count and latency of every request, labelled by matched route
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    let start = Instant::now();
    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    HTTP_REQUESTS
        .with_label_values(&[&method, &route, &status])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &route])
        .observe(start.elapsed().as_secs_f64());

    response
}

/// Encode all registered metrics in the text exposition format
pub fn render() -> Result<(String, Vec<u8>), prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok((encoder.format_type().to_string(), buffer))
}

/// `GET /metrics`
pub async fn metrics_handler() -> Response {
    match render() {
        Ok((content_type, body)) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_registered_metrics() {
        STORAGE_VALIDATIONS.with_label_values(&["success"]).inc();
        MODIFIER_CLEANUPS.with_label_values(&["deleted"]).inc();

        let (content_type, body) = render().unwrap();
        let text = String::from_utf8(body).unwrap();
        assert!(content_type.starts_with("text/plain"));
        assert!(text.contains("velero_dashboard_storage_validations_total"));
        assert!(text.contains("velero_dashboard_modifier_cleanups_total"));
    }
}
