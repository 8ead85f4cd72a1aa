use tracing_subscriber::{fmt, EnvFilter};

/// Install a stderr subscriber. `RUST_LOG` takes precedence over `level`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
