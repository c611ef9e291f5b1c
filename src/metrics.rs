// Metrics and observability module
// This file handles collection and reporting of performance metrics,
// statistics, and monitoring data for the routing engine
//
// Numan Thabit 2025 Nov

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram, register_histogram_vec, CounterVec, Histogram,
    HistogramVec,
};

pub static REQ_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "router_request_latency_seconds",
        "latency for upstream calls",
        &["service", "method"]
    )
    .unwrap()
});

pub static REQ_ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "router_request_errors_total",
        "errors by upstream",
        &["service", "method"]
    )
    .unwrap()
});

/// Routes surviving the depth-bounded search, per quote request
pub static ROUTES_DISCOVERED: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "router_routes_per_request",
        "candidate routes discovered per quote request",
        vec![0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0]
    )
    .unwrap()
});

/// Routes dropped while decoding the aggregated quote response
pub static QUOTE_DROPS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "router_quote_drops_total",
        "routes dropped from a quote batch",
        &["reason"]
    )
    .unwrap()
});
