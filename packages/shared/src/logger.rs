//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `default_level` applies to this binary and the
/// `kartwatch_*` crates, while dependencies stay at `warn`.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let fallback = format!(
        "warn,{bin}={level},kartwatch_server={level},kartwatch_shared={level},tower_http={level}",
        bin = bin_name.replace('-', "_"),
        level = default_level,
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}
