use nsgeo_domain::DomainError;
use std::net::IpAddr;

pub trait GeoIpLookup: Send + Sync {
    /// ISO 3166 country code of `ip`. `Ok(None)` when the database has no
    /// country for the address.
    fn country(&self, ip: IpAddr) -> Result<Option<String>, DomainError>;
}
