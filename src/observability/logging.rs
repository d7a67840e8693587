//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Resolve the log filter from the environment or config
//!
//! # Design Decisions
//! - `RUST_LOG` wins when set and parseable
//! - The configured level applies to this crate and to `tower_http`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is absent.
pub fn default_filter(level: &str) -> String {
    format!("page_dispatch={level},tower_http={level}")
}

/// Install the global subscriber. A second call is ignored.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into());

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
