//! Prometheus metrics
//!
//! ## Counters
//! - `pvz_pickup_points_created_total`
//! - `pvz_receptions_opened_total`
//! - `pvz_products_added_total`
//! - `http_requests_total{method,path,status}`
//!
//! ## Histograms
//! - `http_request_duration_seconds{method,path,status}`

use std::time::Instant;

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{Counter, describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Business counters handed to the service at construction
#[derive(Clone)]
pub struct ServiceMetrics {
    pub pickup_points_created: Counter,
    pub receptions_opened: Counter,
    pub products_added: Counter,
}

impl ServiceMetrics {
    /// Describe every metric and register the business counters with the
    /// installed recorder
    pub fn register() -> Self {
        describe_counter!("http_requests_total", "HTTP requests served");
        describe_histogram!(
            "http_request_duration_seconds",
            "HTTP request latency in seconds"
        );
        describe_counter!(
            "pvz_pickup_points_created_total",
            "Pickup points created"
        );
        describe_counter!("pvz_receptions_opened_total", "Receptions opened");
        describe_counter!(
            "pvz_products_added_total",
            "Products added to open receptions"
        );
        Self {
            pickup_points_created: metrics::counter!("pvz_pickup_points_created_total"),
            receptions_opened: metrics::counter!("pvz_receptions_opened_total"),
            products_added: metrics::counter!("pvz_products_added_total"),
        }
    }

    pub fn noop() -> Self {
        Self {
            pickup_points_created: Counter::noop(),
            receptions_opened: Counter::noop(),
            products_added: Counter::noop(),
        }
    }
}

/// Install the global Prometheus recorder.
///
/// Must run once, before [`ServiceMetrics::register`].
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()
}

/// `/metrics` router served on its own port
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || std::future::ready(handle.render())))
}

/// Record request count and latency per matched route
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    let labels = [("method", method), ("path", path), ("status", status)];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());

    response
}
