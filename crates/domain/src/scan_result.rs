use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::time::Duration;

/// Outcome of scanning one domain.
///
/// Every list-valued field is a `BTreeSet`, so output is deduplicated and
/// sorted without a separate normalisation pass. Empty fields are omitted
/// from the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fqdn: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub elapsed_ms: u64,

    #[serde(rename = "nss", default, skip_serializing_if = "BTreeSet::is_empty")]
    pub nameservers: BTreeSet<String>,

    #[serde(rename = "ns_addrs", default, skip_serializing_if = "BTreeSet::is_empty")]
    pub nameserver_addresses: BTreeSet<String>,

    #[serde(rename = "locs", default, skip_serializing_if = "BTreeSet::is_empty")]
    pub country_codes: BTreeSet<String>,

    #[serde(rename = "errs", default, skip_serializing_if = "BTreeSet::is_empty")]
    pub errors: BTreeSet<String>,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

impl ScanResult {
    pub fn new(fqdn: impl Into<String>) -> Self {
        Self {
            fqdn: fqdn.into(),
            ..Default::default()
        }
    }

    pub fn add_nameserver(&mut self, name: impl Into<String>) {
        self.nameservers.insert(name.into());
    }

    pub fn add_address(&mut self, addr: IpAddr) {
        self.nameserver_addresses.insert(addr.to_string());
    }

    pub fn add_country(&mut self, code: impl Into<String>) {
        let code = code.into();
        if !code.is_empty() {
            self.country_codes.insert(code);
        }
    }

    pub fn record_error(&mut self, error: impl Into<String>) {
        self.errors.insert(error.into());
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_ms = elapsed.as_millis() as u64;
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
