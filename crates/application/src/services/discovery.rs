use crate::ports::DnsLookup;
use async_trait::async_trait;
use nsgeo_domain::{DiscoveryStrategy, QueryError};
use std::sync::Arc;

/// Finds the nameservers that are authoritative for a domain.
#[async_trait]
pub trait AuthoritativeServerDiscovery: Send + Sync {
    async fn discover(&self, fqdn: &str) -> Result<Vec<String>, QueryError>;

    fn strategy(&self) -> DiscoveryStrategy;
}

/// Every nameserver listed in the domain's NS answer.
pub struct NsRecordDiscovery {
    lookup: Arc<dyn DnsLookup>,
}

impl NsRecordDiscovery {
    pub fn new(lookup: Arc<dyn DnsLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl AuthoritativeServerDiscovery for NsRecordDiscovery {
    async fn discover(&self, fqdn: &str) -> Result<Vec<String>, QueryError> {
        self.lookup.nameservers(fqdn).await
    }

    fn strategy(&self) -> DiscoveryStrategy {
        DiscoveryStrategy::Ns
    }
}

/// Only the primary nameserver named in the domain's SOA record.
pub struct SoaPrimaryDiscovery {
    lookup: Arc<dyn DnsLookup>,
}

impl SoaPrimaryDiscovery {
    pub fn new(lookup: Arc<dyn DnsLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl AuthoritativeServerDiscovery for SoaPrimaryDiscovery {
    async fn discover(&self, fqdn: &str) -> Result<Vec<String>, QueryError> {
        Ok(self
            .lookup
            .primary_nameserver(fqdn)
            .await?
            .into_iter()
            .collect())
    }

    fn strategy(&self) -> DiscoveryStrategy {
        DiscoveryStrategy::Soa
    }
}

pub fn discovery_for(
    strategy: DiscoveryStrategy,
    lookup: Arc<dyn DnsLookup>,
) -> Arc<dyn AuthoritativeServerDiscovery> {
    match strategy {
        DiscoveryStrategy::Ns => Arc::new(NsRecordDiscovery::new(lookup)),
        DiscoveryStrategy::Soa => Arc::new(SoaPrimaryDiscovery::new(lookup)),
    }
}
