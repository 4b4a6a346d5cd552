//! Request counters and latency histograms in Prometheus text format

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bounds in seconds; `+Inf` is implied
pub const LATENCY_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug, Clone, Default)]
struct Histogram {
    buckets: [u64; LATENCY_BUCKETS.len()],
    sum: f64,
    count: u64,
}

impl Histogram {
    fn observe(&mut self, secs: f64) {
        for (i, bound) in LATENCY_BUCKETS.iter().enumerate() {
            if secs <= *bound {
                self.buckets[i] += 1;
            }
        }
        self.sum += secs;
        self.count += 1;
    }
}

/// (method, route, status)
type RequestKey = (String, String, u16);
/// (method, route)
type LatencyKey = (String, String);

#[derive(Debug, Default)]
pub struct HttpMetrics {
    requests: Mutex<BTreeMap<RequestKey, u64>>,
    latency: Mutex<BTreeMap<LatencyKey, Histogram>>,
}

impl HttpMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, method: &str, path: &str, status: u16, elapsed: Duration) {
        *self
            .requests
            .lock()
            .entry((method.to_string(), path.to_string(), status))
            .or_insert(0) += 1;

        self.latency
            .lock()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .observe(elapsed.as_secs_f64());
    }

    pub fn request_count(&self, method: &str, path: &str, status: u16) -> u64 {
        self.requests
            .lock()
            .get(&(method.to_string(), path.to_string(), status))
            .copied()
            .unwrap_or(0)
    }

    /// Prometheus text exposition
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("# HELP http_requests_total Total number of HTTP requests\n");
        out.push_str("# TYPE http_requests_total counter\n");
        for ((method, path, status), count) in self.requests.lock().iter() {
            let _ = writeln!(
                out,
                "http_requests_total{{method=\"{}\",path=\"{}\",status=\"{}\"}} {}",
                method, path, status, count
            );
        }

        out.push_str("# HELP http_request_duration_seconds HTTP request latency\n");
        out.push_str("# TYPE http_request_duration_seconds histogram\n");
        for ((method, path), hist) in self.latency.lock().iter() {
            for (bound, count) in LATENCY_BUCKETS.iter().zip(hist.buckets.iter()) {
                let _ = writeln!(
                    out,
                    "http_request_duration_seconds_bucket{{method=\"{}\",path=\"{}\",le=\"{}\"}} {}",
                    method, path, bound, count
                );
            }
            let _ = writeln!(
                out,
                "http_request_duration_seconds_bucket{{method=\"{}\",path=\"{}\",le=\"+Inf\"}} {}",
                method, path, hist.count
            );
            let _ = writeln!(
                out,
                "http_request_duration_seconds_sum{{method=\"{}\",path=\"{}\"}} {}",
                method, path, hist.sum
            );
            let _ = writeln!(
                out,
                "http_request_duration_seconds_count{{method=\"{}\",path=\"{}\"}} {}",
                method, path, hist.count
            );
        }

        out
    }
}

/// Metrics middleware, keyed by the matched route template
pub async fn track_metrics(
    State(metrics): State<Arc<HttpMetrics>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => request.uri().path().to_string(),
    };

    let response = next.run(request).await;

    metrics.record(&method, &path, response.status().as_u16(), start.elapsed());
    response
}
