mod dns_lookup;
mod domain_scanner;
mod geoip;
mod public_suffix;
mod result_sink;
mod scan_progress;

pub use dns_lookup::DnsLookup;
pub use domain_scanner::DomainScanner;
pub use geoip::GeoIpLookup;
pub use public_suffix::PublicSuffixMatcher;
pub use result_sink::ResultSink;
pub use scan_progress::{NoopProgress, ScanProgress};

// Re-export for convenience
pub use nsgeo_domain::{QueryError, RecordType, ScanResult};
