use crate::ports::{DnsLookup, DomainScanner, GeoIpLookup};
use crate::services::AuthoritativeServerDiscovery;
use async_trait::async_trait;
use nsgeo_domain::{QueryError, RecordType, ScanResult};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Nameservers whose addresses are resolved per domain. Should be enough.
pub const DEFAULT_MAX_NAMESERVERS: usize = 4;

struct AddressLookup {
    nameserver: String,
    record_type: RecordType,
    outcome: Result<Vec<IpAddr>, QueryError>,
}

/// Scans one domain: discovery, then A/AAAA for up to `max_nameservers`
/// nameservers in parallel, then GeoIP enrichment of every address.
pub struct ScanDomainUseCase {
    discovery: Arc<dyn AuthoritativeServerDiscovery>,
    lookup: Arc<dyn DnsLookup>,
    geoip: Arc<dyn GeoIpLookup>,
    max_nameservers: usize,
}

impl ScanDomainUseCase {
    pub fn new(
        discovery: Arc<dyn AuthoritativeServerDiscovery>,
        lookup: Arc<dyn DnsLookup>,
        geoip: Arc<dyn GeoIpLookup>,
    ) -> Self {
        Self {
            discovery,
            lookup,
            geoip,
            max_nameservers: DEFAULT_MAX_NAMESERVERS,
        }
    }

    pub fn with_max_nameservers(mut self, max_nameservers: usize) -> Self {
        self.max_nameservers = max_nameservers.max(1);
        self
    }

    pub async fn execute(&self, fqdn: &str) -> ScanResult {
        let start = Instant::now();
        let mut result = ScanResult::new(fqdn);

        self.collect(fqdn, &mut result).await;

        result.set_elapsed(start.elapsed());
        debug!(
            fqdn = %fqdn,
            elapsed_ms = result.elapsed_ms,
            nameservers = result.nameservers.len(),
            addresses = result.nameserver_addresses.len(),
            errors = result.errors.len(),
            "Domain scanned"
        );
        result
    }

    async fn collect(&self, fqdn: &str, result: &mut ScanResult) {
        let nameservers = match self.discovery.discover(fqdn).await {
            Ok(nameservers) => nameservers,
            Err(e) => {
                result.record_error(format!("failed to lookup ns, {}", e));
                return;
            }
        };

        if nameservers.is_empty() {
            result.record_error("no ns record");
            return;
        }

        let selected: Vec<String> = nameservers
            .iter()
            .take(self.max_nameservers)
            .cloned()
            .collect();
        for ns in nameservers {
            result.add_nameserver(ns);
        }

        let addresses = self.resolve_addresses(selected, result).await;

        for addr in addresses {
            result.add_address(addr);
            match self.geoip.country(addr) {
                Ok(Some(code)) => result.add_country(code),
                Ok(None) => debug!(addr = %addr, "No country for address"),
                Err(e) => warn!(addr = %addr, error = %e, "GeoIP lookup failed"),
            }
        }
    }

    /// Runs every A/AAAA lookup on its own task and joins all of them
    /// before returning. Each task hands back its own outcome.
    async fn resolve_addresses(
        &self,
        nameservers: Vec<String>,
        result: &mut ScanResult,
    ) -> BTreeSet<IpAddr> {
        let mut tasks = JoinSet::new();
        for nameserver in nameservers {
            for record_type in RecordType::ADDRESS_TYPES {
                let lookup = Arc::clone(&self.lookup);
                let nameserver = nameserver.clone();
                tasks.spawn(async move {
                    let outcome = lookup.addresses(&nameserver, record_type).await;
                    AddressLookup {
                        nameserver,
                        record_type,
                        outcome,
                    }
                });
            }
        }

        let mut addresses = BTreeSet::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(AddressLookup {
                    outcome: Ok(found), ..
                }) => addresses.extend(found),
                Ok(AddressLookup {
                    nameserver,
                    record_type,
                    outcome: Err(e),
                }) => result.record_error(format!(
                    "failed to lookup ns {} addr {}, {}",
                    nameserver, record_type, e
                )),
                Err(e) => result.record_error(format!("address lookup task failed, {}", e)),
            }
        }
        addresses
    }
}

#[async_trait]
impl DomainScanner for ScanDomainUseCase {
    async fn scan(&self, fqdn: &str) -> ScanResult {
        self.execute(fqdn).await
    }
}
