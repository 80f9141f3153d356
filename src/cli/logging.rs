//! Logging setup for the host process
//!
//! Logs go to stderr so command output on stdout stays clean.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::cli::output;

/// Filter directive for a `-d` count; `fallback` applies when no `-d` was given.
pub fn filter_directive(verbosity: u8, fallback: Option<&str>) -> String {
    match verbosity {
        0 => fallback.unwrap_or("warn").to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn setup_logging(verbosity: u8, fallback: Option<&str>) {
    if verbosity > 3 {
        output::warning("verbosity is capped at -ddd");
    }
    let directive = filter_directive(verbosity, fallback);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        output::warning(&format!("invalid log filter '{directive}': {e}"));
        EnvFilter::new("warn")
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_ok() {
        tracing::debug!("Logging initialised: {}", directive);
    }
}
