//! Tracing subscriber setup for the command-line tool

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for a verbosity count and quiet flag
///
/// Quiet wins over verbosity. Without flags only warnings are shown.
pub const fn filter_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr fmt subscriber; `RUST_LOG` overrides the flags
///
/// Returns false if a global subscriber was already installed.
pub fn init_tracing(verbosity: u8, quiet: bool) -> bool {
    let directive = filter_directive(verbosity, quiet);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init()
        .is_ok()
}
