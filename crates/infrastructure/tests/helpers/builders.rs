#![allow(dead_code)]
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use nsgeo_application::ports::GeoIpLookup;
use nsgeo_domain::DomainError;
use nsgeo_infrastructure::dns::{bind_for, ClientOptions, DnsClient, MessageCodec};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Short timings so timeout tests finish quickly.
pub fn fast_options() -> ClientOptions {
    ClientOptions {
        timeout: Duration::from_millis(400),
        retransmit_interval: Duration::from_millis(100),
    }
}

pub async fn client_for(server: SocketAddr, options: ClientOptions) -> DnsClient {
    let socket = bind_for(&[server]).await.unwrap();
    DnsClient::new(socket, MessageCodec::default(), options).unwrap()
}

pub fn query(id: u16, name: &str, record_type: RecordType) -> Message {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(Name::from_ascii(name).unwrap(), record_type));
    message
}

/// In-memory stand-in for a GeoIP database.
#[derive(Default)]
pub struct StaticGeoIp {
    countries: HashMap<IpAddr, String>,
}

impl StaticGeoIp {
    pub fn with(mut self, ip: &str, code: &str) -> Self {
        self.countries.insert(ip.parse().unwrap(), code.to_string());
        self
    }
}

impl GeoIpLookup for StaticGeoIp {
    fn country(&self, ip: IpAddr) -> Result<Option<String>, DomainError> {
        Ok(self.countries.get(&ip).cloned())
    }
}
