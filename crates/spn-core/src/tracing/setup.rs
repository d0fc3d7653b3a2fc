//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the tracing/logging system.
///
/// Reads the `SPN_LOG` environment variable for per-module log levels.
/// Format: `SPN_LOG=spn_learn=debug,spn_graph=info`
///
/// Falls back to `spn=info` if `SPN_LOG` is not set or is invalid.
///
/// Idempotent: only the first call installs a subscriber.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("SPN_LOG").unwrap_or_else(|_| EnvFilter::new("spn=info"));
        install(filter);
    });
}

/// Initialize tracing with a fixed level, e.g. `ObservabilityConfig::effective_log_level`.
///
/// `SPN_LOG` still takes precedence when set. Shares the idempotence guard
/// with [`init_tracing`].
pub fn init_tracing_with_level(level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("SPN_LOG")
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        install(filter);
    });
}

fn install(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();
}
