use async_trait::async_trait;
use nsgeo_domain::{QueryError, RecordType};
use std::net::IpAddr;

/// Typed DNS questions the scanner needs answered by an upstream resolver.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// Names from the NS records in the answer section, in answer order.
    async fn nameservers(&self, fqdn: &str) -> Result<Vec<String>, QueryError>;

    /// MNAME of the SOA record in the answer section, if any.
    async fn primary_nameserver(&self, fqdn: &str) -> Result<Option<String>, QueryError>;

    /// A or AAAA addresses of `host`. Any other record type is rejected.
    async fn addresses(
        &self,
        host: &str,
        record_type: RecordType,
    ) -> Result<Vec<IpAddr>, QueryError>;
}
