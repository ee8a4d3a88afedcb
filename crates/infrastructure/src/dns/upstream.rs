use nsgeo_domain::DomainError;
use std::net::SocketAddr;
use std::sync::Arc;

/// Upstream resolvers a scan may query. Each query picks one uniformly at
/// random.
#[derive(Debug, Clone)]
pub struct UpstreamSet {
    servers: Arc<[SocketAddr]>,
}

impl UpstreamSet {
    pub fn new(servers: Vec<SocketAddr>) -> Result<Self, DomainError> {
        if servers.is_empty() {
            return Err(DomainError::InvalidUpstream(
                "no upstream address".to_string(),
            ));
        }
        Ok(Self {
            servers: servers.into(),
        })
    }

    /// Parses `ip:port` endpoints such as `8.8.8.8:53` or `[2001:db8::1]:53`.
    pub fn parse<S: AsRef<str>>(endpoints: &[S]) -> Result<Self, DomainError> {
        let servers = endpoints
            .iter()
            .map(|s| {
                let s = s.as_ref().trim();
                s.parse::<SocketAddr>()
                    .map_err(|e| DomainError::InvalidUpstream(format!("'{}': {}", s, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(servers)
    }

    pub fn pick(&self) -> SocketAddr {
        self.servers[fastrand::usize(..self.servers.len())]
    }

    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
