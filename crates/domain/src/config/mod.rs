//! Configuration for nsgeo
//!
//! - `root`: top-level configuration and CLI overrides
//! - `scan`: upstreams, admission limits and query timing
//! - `logging`: log level
//! - `errors`: configuration errors

pub mod errors;
pub mod logging;
pub mod root;
pub mod scan;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use scan::{DiscoveryStrategy, ScanConfig};
