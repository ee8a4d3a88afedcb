use async_trait::async_trait;
use nsgeo_domain::ScanResult;

/// Produces exactly one result for one domain; failures are recorded in
/// the result rather than returned.
#[async_trait]
pub trait DomainScanner: Send + Sync {
    async fn scan(&self, fqdn: &str) -> ScanResult;
}
