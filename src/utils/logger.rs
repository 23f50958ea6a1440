use std::io;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system
///
/// Logs go to stderr so that stdout carries nothing but the generated list.
/// `RUST_LOG` takes precedence over the verbosity flag.
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { "warn,listgen=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    // A second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .try_init();
}

/// Log an info message with a tag prefix
pub fn log_info(tag: &str, message: impl std::fmt::Display) {
    info!("{} {}", tag, message);
}

/// Log a warning message with a tag prefix
pub fn log_warn(tag: &str, message: impl std::fmt::Display) {
    warn!("{} {}", tag, message);
}

/// Log a debug message
pub fn log_debug(message: impl std::fmt::Display) {
    debug!("{}", message);
}

/// Plain status line on stderr, shown regardless of log level
pub fn log_status(message: impl std::fmt::Display) {
    eprintln!("{}", message);
}
