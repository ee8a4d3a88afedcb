use maxminddb::{geoip2, MaxMindDBError, Reader};
use nsgeo_application::ports::GeoIpLookup;
use nsgeo_domain::DomainError;
use std::net::IpAddr;
use std::path::Path;
use tracing::info;

/// Country lookups against a MaxMind GeoIP2/GeoLite2 database held in memory.
pub struct MaxMindCountryReader {
    reader: Reader<Vec<u8>>,
}

impl MaxMindCountryReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let reader = Reader::open_readfile(path).map_err(|e| {
            DomainError::GeoIp(format!("failed to open {}: {}", path.display(), e))
        })?;
        info!(
            path = %path.display(),
            database_type = %reader.metadata.database_type,
            "GeoIP database loaded"
        );
        Ok(Self { reader })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DomainError> {
        let reader = Reader::from_source(bytes)
            .map_err(|e| DomainError::GeoIp(format!("invalid database: {}", e)))?;
        Ok(Self { reader })
    }
}

impl GeoIpLookup for MaxMindCountryReader {
    fn country(&self, ip: IpAddr) -> Result<Option<String>, DomainError> {
        match self.reader.lookup::<geoip2::Country>(ip) {
            Ok(record) => Ok(record
                .country
                .and_then(|country| country.iso_code)
                .filter(|code| !code.is_empty())
                .map(str::to_string)),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Ok(None),
            Err(e) => Err(DomainError::GeoIp(e.to_string())),
        }
    }
}
