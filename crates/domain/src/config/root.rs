use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::scan::{DiscoveryStrategy, ScanConfig};

const DEFAULT_CONFIG_FILE: &str = "nsgeo.toml";

/// Main configuration structure for nsgeo
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. nsgeo.toml in current directory
    /// 3. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(upstreams) = overrides.upstreams {
            if !upstreams.is_empty() {
                self.scan.upstreams = upstreams;
            }
        }
        if let Some(cc) = overrides.max_concurrency {
            self.scan.max_concurrency = cc;
        }
        if let Some(sps) = overrides.max_scans_per_second {
            self.scan.max_scans_per_second = sps;
        }
        if let Some(discovery) = overrides.discovery {
            self.scan.discovery = discovery;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.upstreams.is_empty() {
            return Err(ConfigError::Validation(
                "No upstream servers configured".to_string(),
            ));
        }

        self.scan.upstream_addrs().map_err(ConfigError::Validation)?;

        if self.scan.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "query_timeout_ms cannot be 0".to_string(),
            ));
        }

        if self.scan.retransmit_interval_ms == 0
            || self.scan.retransmit_interval_ms >= self.scan.query_timeout_ms
        {
            return Err(ConfigError::Validation(format!(
                "retransmit_interval_ms must be between 1 and {} (query_timeout_ms)",
                self.scan.query_timeout_ms - 1
            )));
        }

        if self.scan.max_nameservers == 0 {
            return Err(ConfigError::Validation(
                "max_nameservers cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub upstreams: Option<Vec<String>>,
    pub max_concurrency: Option<usize>,
    pub max_scans_per_second: Option<u32>,
    pub discovery: Option<DiscoveryStrategy>,
    pub log_level: Option<String>,
}
