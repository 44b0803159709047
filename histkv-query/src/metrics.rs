//! Request counters for the query gateway

use axum::http::StatusCode;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Thread-safe counters, updated once per request
#[derive(Debug)]
pub struct GatewayMetrics {
    /// Total read requests handled
    pub requests_total: AtomicU64,

    /// Requests answered with data
    pub success_total: AtomicU64,

    /// Requests rejected during parameter validation
    pub rejected_total: AtomicU64,

    /// Requests where the store reported an error
    pub store_errors_total: AtomicU64,

    /// Responses that could not be encoded as requested
    pub encoding_errors_total: AtomicU64,

    /// Versions returned across all successful requests
    pub versions_returned_total: AtomicU64,

    /// Cumulative time spent waiting on the store
    pub store_time_total_ms: AtomicU64,

    /// Failed requests keyed by error category
    errors_by_category: Mutex<BTreeMap<&'static str, u64>>,

    /// Service start time
    start_time: Instant,
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            success_total: AtomicU64::new(0),
            rejected_total: AtomicU64::new(0),
            store_errors_total: AtomicU64::new(0),
            encoding_errors_total: AtomicU64::new(0),
            versions_returned_total: AtomicU64::new(0),
            store_time_total_ms: AtomicU64::new(0),
            errors_by_category: Mutex::new(BTreeMap::new()),
            start_time: Instant::now(),
        }
    }
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request rejected before reaching the store
    pub fn record_rejection(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that reached the store, with the status it was
    /// finally rendered with
    pub fn record_store_call(&self, duration: Duration, status: StatusCode, versions: usize) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.store_time_total_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);

        match status {
            s if s.is_success() => {
                self.success_total.fetch_add(1, Ordering::Relaxed);
                self.versions_returned_total
                    .fetch_add(versions as u64, Ordering::Relaxed);
            }
            s if s == StatusCode::INTERNAL_SERVER_ERROR => {
                self.encoding_errors_total.fetch_add(1, Ordering::Relaxed);
            }
            _ => {
                self.store_errors_total.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Count one failed request under `category`
    pub fn record_error(&self, category: &'static str) {
        *self.errors_by_category.lock().entry(category).or_insert(0) += 1;
    }

    /// Failure counts per error category
    pub fn errors_by_category(&self) -> BTreeMap<&'static str, u64> {
        self.errors_by_category.lock().clone()
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> GatewayMetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let store_calls = requests - self.rejected_total.load(Ordering::Relaxed).min(requests);
        let store_time = self.store_time_total_ms.load(Ordering::Relaxed);

        GatewayMetricsSnapshot {
            requests_total: requests,
            success_total: self.success_total.load(Ordering::Relaxed),
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
            store_errors_total: self.store_errors_total.load(Ordering::Relaxed),
            encoding_errors_total: self.encoding_errors_total.load(Ordering::Relaxed),
            versions_returned_total: self.versions_returned_total.load(Ordering::Relaxed),
            store_time_total_ms: store_time,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            avg_store_time_ms: if store_calls > 0 {
                store_time as f64 / store_calls as f64
            } else {
                0.0
            },
        }
    }

    /// Generate Prometheus format metrics
    pub fn prometheus_format(&self) -> String {
        let snapshot = self.snapshot();

        let mut text = format!(
            "# HELP histkv_gateway_requests_total Total number of read requests handled\n\
             # TYPE histkv_gateway_requests_total counter\n\
             histkv_gateway_requests_total {}\n\
             \n\
             # HELP histkv_gateway_success_total Read requests answered with data\n\
             # TYPE histkv_gateway_success_total counter\n\
             histkv_gateway_success_total {}\n\
             \n\
             # HELP histkv_gateway_rejected_total Read requests with invalid parameters\n\
             # TYPE histkv_gateway_rejected_total counter\n\
             histkv_gateway_rejected_total {}\n\
             \n\
             # HELP histkv_gateway_store_errors_total Read requests failed by the store\n\
             # TYPE histkv_gateway_store_errors_total counter\n\
             histkv_gateway_store_errors_total {}\n\
             \n\
             # HELP histkv_gateway_encoding_errors_total Responses that could not be encoded\n\
             # TYPE histkv_gateway_encoding_errors_total counter\n\
             histkv_gateway_encoding_errors_total {}\n\
             \n\
             # HELP histkv_gateway_versions_returned_total Total number of versions returned\n\
             # TYPE histkv_gateway_versions_returned_total counter\n\
             histkv_gateway_versions_returned_total {}\n\
             \n\
             # HELP histkv_gateway_store_time_total_ms Total time spent in store calls in milliseconds\n\
             # TYPE histkv_gateway_store_time_total_ms counter\n\
             histkv_gateway_store_time_total_ms {}\n\
             \n\
             # HELP histkv_gateway_uptime_seconds Service uptime in seconds\n\
             # TYPE histkv_gateway_uptime_seconds gauge\n\
             histkv_gateway_uptime_seconds {}\n\
             \n\
             # HELP histkv_gateway_avg_store_time_ms Average store call time in milliseconds\n\
             # TYPE histkv_gateway_avg_store_time_ms gauge\n\
             histkv_gateway_avg_store_time_ms {}\n",
            snapshot.requests_total,
            snapshot.success_total,
            snapshot.rejected_total,
            snapshot.store_errors_total,
            snapshot.encoding_errors_total,
            snapshot.versions_returned_total,
            snapshot.store_time_total_ms,
            snapshot.uptime_seconds,
            snapshot.avg_store_time_ms
        );

        text.push_str(
            "\n# HELP histkv_gateway_errors_total Failed read requests by error category\n\
             # TYPE histkv_gateway_errors_total counter\n",
        );
        for (category, count) in self.errors_by_category() {
            text.push_str(&format!(
                "histkv_gateway_errors_total{{category=\"{}\"}} {}\n",
                category, count
            ));
        }
        text
    }
}

/// Snapshot of gateway metrics at a point in time
#[derive(Debug, Clone)]
pub struct GatewayMetricsSnapshot {
    pub requests_total: u64,
    pub success_total: u64,
    pub rejected_total: u64,
    pub store_errors_total: u64,
    pub encoding_errors_total: u64,
    pub versions_returned_total: u64,
    pub store_time_total_ms: u64,
    pub uptime_seconds: u64,
    pub avg_store_time_ms: f64,
}

/// Helper for timing store calls
pub struct StoreTimer {
    start: Instant,
}

impl StoreTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finish timing and record to the metrics
    pub fn finish(self, metrics: &GatewayMetrics, status: StatusCode, versions: usize) {
        metrics.record_store_call(self.elapsed(), status, versions);
    }
}
