use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins when set; otherwise the
/// crate logs at info, or debug in verbose mode.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "trip_lake=debug"
    } else {
        "trip_lake=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_thread_names(verbose)
        .with_target(false);

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
