pub mod preprocess_domains;
pub mod run_scan;
pub mod scan_domain;

pub use preprocess_domains::{PreprocessDomainsUseCase, PreprocessOutcome};
pub use run_scan::{RunScanUseCase, RunSummary, ScanLimits};
pub use scan_domain::{ScanDomainUseCase, DEFAULT_MAX_NAMESERVERS};
