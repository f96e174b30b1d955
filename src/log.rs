// src/log.rs
// Diagnostics go through `tracing` to stderr, stamped with time since start.
// Stdout is left to the progress lines.

use tracing::Level;
use tracing_subscriber::{fmt, fmt::time::Uptime, EnvFilter};

/// Map `-v` repetitions to a default level. `RUST_LOG` always wins.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbosity: u8) {
    let level = level_for(verbosity);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level.as_str().to_lowercase())));

    let _ = fmt()
        .with_env_filter(filter)
        .with_timer(Uptime::default())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
