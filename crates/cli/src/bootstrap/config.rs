use nsgeo_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}

/// Logged after the subscriber is installed, since the level comes from
/// the configuration itself.
pub fn log_config(config: &Config, config_path: Option<&str>) {
    info!(
        config_file = config_path.unwrap_or("default"),
        upstreams = ?config.scan.upstreams,
        max_concurrency = config.scan.max_concurrency,
        max_scans_per_second = config.scan.max_scans_per_second,
        discovery = config.scan.discovery.as_str(),
        "Configuration loaded"
    );
}
