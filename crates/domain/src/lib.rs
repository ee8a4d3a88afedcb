//! nsgeo Domain Layer
pub mod config;
pub mod errors;
pub mod fqdn;
pub mod record_type;
pub mod scan_result;

pub use config::{CliOverrides, Config, ConfigError, DiscoveryStrategy, ScanConfig};
pub use errors::{DomainError, QueryError};
pub use record_type::RecordType;
pub use scan_result::ScanResult;
