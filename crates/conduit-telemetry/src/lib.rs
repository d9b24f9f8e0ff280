//! Logging setup for Conduit
//!
//! Initializes the `tracing-subscriber` registry with an environment
//! filter and a compact fmt layer. Exporters are intentionally absent;
//! the gateway logs locally.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber
///
/// `log_filter` is the default directive when `RUST_LOG` is unset.
/// Must be called at most once per process.
pub fn init(log_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
