//! Application metrics collection and reporting.

use metrics::{counter, gauge, histogram};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Metrics collector for the viewer service.
#[derive(Debug)]
pub struct MetricsCollector {
    /// Request counts
    pub page_requests: AtomicU64,
    pub api_requests: AtomicU64,

    /// Layer selection outcomes
    pub selections: AtomicU64,
    pub selection_errors: AtomicU64,

    pub downloads: AtomicU64,

    /// Page sessions opened since startup
    pub sessions_opened: AtomicU64,

    /// Capabilities load outcomes
    pub capabilities_loads: AtomicU64,
    pub capabilities_errors: AtomicU64,
    capabilities_load_us: AtomicU64,

    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            page_requests: AtomicU64::new(0),
            api_requests: AtomicU64::new(0),
            selections: AtomicU64::new(0),
            selection_errors: AtomicU64::new(0),
            downloads: AtomicU64::new(0),
            sessions_opened: AtomicU64::new(0),
            capabilities_loads: AtomicU64::new(0),
            capabilities_errors: AtomicU64::new(0),
            capabilities_load_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_page_request(&self) {
        self.page_requests.fetch_add(1, Ordering::Relaxed);
        counter!("viewer_page_requests_total").increment(1);
    }

    pub fn record_api_request(&self, endpoint: &'static str) {
        self.api_requests.fetch_add(1, Ordering::Relaxed);
        counter!("viewer_api_requests_total", "endpoint" => endpoint).increment(1);
    }

    /// Record a layer selection applied to the map
    pub fn record_selection(&self, success: bool) {
        self.selections.fetch_add(1, Ordering::Relaxed);
        counter!("viewer_layer_selections_total").increment(1);
        if !success {
            self.selection_errors.fetch_add(1, Ordering::Relaxed);
            counter!("viewer_layer_selection_errors_total").increment(1);
        }
    }

    pub fn record_download(&self, format: &'static str) {
        self.downloads.fetch_add(1, Ordering::Relaxed);
        counter!("viewer_downloads_total", "format" => format).increment(1);
    }

    pub fn record_session_opened(&self, active: usize) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
        counter!("viewer_sessions_opened_total").increment(1);
        gauge!("viewer_active_sessions").set(active as f64);
    }

    /// Record the outcome of the startup capabilities load
    pub fn record_capabilities_load(&self, elapsed: Duration, success: bool, layers: usize) {
        self.capabilities_loads.fetch_add(1, Ordering::Relaxed);
        self.capabilities_load_us
            .store(elapsed.as_micros() as u64, Ordering::Relaxed);
        counter!("viewer_capabilities_loads_total").increment(1);
        histogram!("viewer_capabilities_load_seconds").record(elapsed.as_secs_f64());
        if success {
            gauge!("viewer_catalog_layers").set(layers as f64);
        } else {
            self.capabilities_errors.fetch_add(1, Ordering::Relaxed);
            counter!("viewer_capabilities_errors_total").increment(1);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            page_requests: self.page_requests.load(Ordering::Relaxed),
            api_requests: self.api_requests.load(Ordering::Relaxed),
            selections: self.selections.load(Ordering::Relaxed),
            selection_errors: self.selection_errors.load(Ordering::Relaxed),
            downloads: self.downloads.load(Ordering::Relaxed),
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            capabilities_loads: self.capabilities_loads.load(Ordering::Relaxed),
            capabilities_errors: self.capabilities_errors.load(Ordering::Relaxed),
            capabilities_load_ms: self.capabilities_load_us.load(Ordering::Relaxed) as f64 / 1000.0,
        }
    }
}

/// Point-in-time copy of the counters, served as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub page_requests: u64,
    pub api_requests: u64,
    pub selections: u64,
    pub selection_errors: u64,
    pub downloads: u64,
    pub sessions_opened: u64,
    pub capabilities_loads: u64,
    pub capabilities_errors: u64,
    pub capabilities_load_ms: f64,
}
