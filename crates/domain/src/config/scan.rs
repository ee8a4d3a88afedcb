use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// How the authoritative nameservers of a domain are discovered.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryStrategy {
    /// Every name in the NS answer.
    #[default]
    Ns,

    /// Only the primary nameserver named by the SOA record.
    Soa,
}

impl DiscoveryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ns => "ns",
            Self::Soa => "soa",
        }
    }
}

impl FromStr for DiscoveryStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ns" => Ok(Self::Ns),
            "soa" => Ok(Self::Soa),
            other => Err(format!("unknown discovery strategy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Upstream resolvers as `ip:port`; each query picks one at random.
    #[serde(default = "default_upstreams")]
    pub upstreams: Vec<String>,

    /// Maximum number of domains scanned at the same time. 0 = unlimited.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Maximum number of scans started per second. 0 = unlimited.
    #[serde(default = "default_max_scans_per_second")]
    pub max_scans_per_second: u32,

    #[serde(default)]
    pub discovery: DiscoveryStrategy,

    /// Nameservers whose addresses are looked up per domain.
    #[serde(default = "default_max_nameservers")]
    pub max_nameservers: usize,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_retransmit_interval_ms")]
    pub retransmit_interval_ms: u64,

    #[serde(default = "default_edns_payload_size")]
    pub edns_payload_size: u16,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            upstreams: default_upstreams(),
            max_concurrency: default_max_concurrency(),
            max_scans_per_second: default_max_scans_per_second(),
            discovery: DiscoveryStrategy::default(),
            max_nameservers: default_max_nameservers(),
            query_timeout_ms: default_query_timeout_ms(),
            retransmit_interval_ms: default_retransmit_interval_ms(),
            edns_payload_size: default_edns_payload_size(),
        }
    }
}

impl ScanConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn retransmit_interval(&self) -> Duration {
        Duration::from_millis(self.retransmit_interval_ms)
    }

    /// Parses every configured upstream, failing on the first invalid one.
    pub fn upstream_addrs(&self) -> Result<Vec<SocketAddr>, String> {
        self.upstreams
            .iter()
            .map(|s| {
                s.trim()
                    .parse::<SocketAddr>()
                    .map_err(|e| format!("invalid upstream '{}': {}", s, e))
            })
            .collect()
    }
}

fn default_upstreams() -> Vec<String> {
    vec!["8.8.8.8:53".to_string()]
}

fn default_max_concurrency() -> usize {
    20
}

fn default_max_scans_per_second() -> u32 {
    100
}

fn default_max_nameservers() -> usize {
    4
}

fn default_query_timeout_ms() -> u64 {
    5000
}

fn default_retransmit_interval_ms() -> u64 {
    1000
}

fn default_edns_payload_size() -> u16 {
    1200
}
