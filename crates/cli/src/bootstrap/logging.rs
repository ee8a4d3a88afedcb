use nsgeo_domain::Config;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over the configured
/// level; `--debug` wins over both.
pub fn init_logging(config: &Config, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    debug!(level = %config.logging.level, "Logging initialized");
}
