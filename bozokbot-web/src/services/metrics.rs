//! Prometheus metrics for the chat front end.
//!
//! Inbound HTTP traffic is recorded by the request middleware; backend calls
//! are recorded by the gateway.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

static METRICS: OnceLock<Metrics> = OnceLock::new();

struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    backend_requests_total: IntCounterVec,
    backend_request_duration_seconds: HistogramVec,
}

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let backend_requests_total = IntCounterVec::new(
            Opts::new(
                "backend_requests_total",
                "Calls to the question-answering backend by outcome",
            ),
            &["endpoint", "outcome"],
        )
        .expect("metric can be created");

        // Answer generation routinely takes tens of seconds.
        let backend_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "backend_request_duration_seconds",
                "Question-answering backend latency in seconds",
            )
            .buckets(vec![0.05, 0.25, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]),
            &["endpoint"],
        )
        .expect("metric can be created");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(backend_requests_total.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(backend_request_duration_seconds.clone()))
            .expect("collector can be registered");

        Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            backend_requests_total,
            backend_request_duration_seconds,
        }
    }
}

fn metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}

/// Register all collectors up front so `/metrics` lists them before traffic.
pub fn init_metrics() {
    metrics();
}

/// Render the registry in the Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&metrics().registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

pub fn record_http_request(method: &str, path: &str, status: &str, duration_secs: f64) {
    let metrics = metrics();
    metrics
        .http_requests_total
        .with_label_values(&[method, path, status])
        .inc();
    metrics
        .http_request_duration_seconds
        .with_label_values(&[method, path, status])
        .observe(duration_secs);
}

/// Record one backend call. `outcome` is `success`, `http_error` or
/// `transport_error`.
pub fn record_backend_request(endpoint: &str, outcome: &str, duration_secs: f64) {
    let metrics = metrics();
    metrics
        .backend_requests_total
        .with_label_values(&[endpoint, outcome])
        .inc();
    metrics
        .backend_request_duration_seconds
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}
