//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): requests by descriptor kind and status
//! - `dispatch_failures_total` (counter): failures by kind and whether a forward matched
//! - `dispatch_duration_seconds` (histogram): match-to-write latency
//! - `rule_table_version` (gauge): version of the published rule table
//!
//! # Design Decisions
//! - Unmatched and failed dispatches use the `error` kind label
//! - Histogram buckets tuned for in-process page rendering

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};

const DURATION_BUCKETS: &[f64] = &[0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(Matcher::Suffix("duration_seconds".to_string()), DURATION_BUCKETS)?
        .install()?;

    describe_counter!("dispatch_requests_total", "Dispatched requests by descriptor kind and status");
    describe_counter!("dispatch_failures_total", "Handler failures by kind and forward match");
    describe_histogram!("dispatch_duration_seconds", "Time from rule match to response written");
    describe_gauge!("rule_table_version", "Version of the currently published rule table");

    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one finished dispatch.
pub fn record_dispatch(kind: &str, status: u16, start: Instant) {
    counter!(
        "dispatch_requests_total",
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("dispatch_duration_seconds", "kind" => kind.to_string()).record(start.elapsed().as_secs_f64());
}

/// Record a failure reaching the outcome resolver.
pub fn record_failure(kind: &str, mapped: bool) {
    counter!(
        "dispatch_failures_total",
        "kind" => kind.to_string(),
        "mapped" => if mapped { "true" } else { "false" }
    )
    .increment(1);
}

pub fn record_table_version(version: u64) {
    gauge!("rule_table_version").set(version as f64);
}
