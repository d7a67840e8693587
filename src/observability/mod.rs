//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, resolver, server and watcher produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt subscriber, filtered by RUST_LOG or config)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Recording a metric without an installed recorder is a no-op
//! - `RUST_LOG` overrides the configured log level

pub mod logging;
pub mod metrics;
