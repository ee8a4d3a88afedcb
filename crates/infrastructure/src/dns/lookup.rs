//! [`DnsLookup`] adapter that sends every question through the shared
//! [`DnsClient`] to a random upstream resolver.

use super::client::DnsClient;
use super::message_builder::{MessageBuilder, DEFAULT_EDNS_PAYLOAD};
use super::upstream::UpstreamSet;
use async_trait::async_trait;
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RData;
use nsgeo_application::ports::DnsLookup;
use nsgeo_domain::{QueryError, RecordType};
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Fresh transaction ids tried after the first one collides.
const MAX_COLLISION_RETRIES: u32 = 3;

pub struct UpstreamResolver {
    client: DnsClient,
    upstreams: UpstreamSet,
    shutdown: CancellationToken,
    edns_payload: u16,
}

impl UpstreamResolver {
    pub fn new(client: DnsClient, upstreams: UpstreamSet) -> Self {
        Self {
            client,
            upstreams,
            shutdown: CancellationToken::new(),
            edns_payload: DEFAULT_EDNS_PAYLOAD,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn with_edns_payload(mut self, size: u16) -> Self {
        self.edns_payload = size;
        self
    }

    /// One question, one answer with a success rcode.
    async fn exchange(&self, name: &str, record_type: RecordType) -> Result<Message, QueryError> {
        let mut attempt = 0;
        loop {
            let id = self.client.next_transaction_id();
            let message = MessageBuilder::build_query(id, name, record_type, self.edns_payload)
                .map_err(|e| QueryError::Encode(e.to_string()))?;
            let server = self.upstreams.pick();

            match self.client.query(&message, server, &self.shutdown).await {
                Ok(response) => {
                    let rcode = response.message.response_code();
                    if rcode != ResponseCode::NoError {
                        debug!(name = %name, record_type = %record_type, server = %server, rcode = ?rcode, "Upstream returned error rcode");
                        return Err(QueryError::ResponseCode(u16::from(rcode)));
                    }
                    return Ok(response.message);
                }
                Err(QueryError::Collision) if attempt < MAX_COLLISION_RETRIES => {
                    attempt += 1;
                    debug!(name = %name, id, attempt, "Transaction id collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl DnsLookup for UpstreamResolver {
    async fn nameservers(&self, fqdn: &str) -> Result<Vec<String>, QueryError> {
        let message = self.exchange(fqdn, RecordType::NS).await?;
        Ok(nameservers_in(&message))
    }

    async fn primary_nameserver(&self, fqdn: &str) -> Result<Option<String>, QueryError> {
        let message = self.exchange(fqdn, RecordType::SOA).await?;
        Ok(primary_in(&message))
    }

    async fn addresses(
        &self,
        host: &str,
        record_type: RecordType,
    ) -> Result<Vec<IpAddr>, QueryError> {
        if !record_type.is_address() {
            return Err(QueryError::InvalidQuestion);
        }
        let message = self.exchange(host, record_type).await?;
        Ok(addresses_in(&message))
    }
}

/// NS targets from the answer section, lower-cased, in answer order.
fn nameservers_in(message: &Message) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in message.answers() {
        if let RData::NS(ns) = record.data() {
            let name = ns.0.to_ascii().to_ascii_lowercase();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn primary_in(message: &Message) -> Option<String> {
    message.answers().iter().find_map(|record| match record.data() {
        RData::SOA(soa) => Some(soa.mname().to_ascii().to_ascii_lowercase()),
        _ => None,
    })
}

fn addresses_in(message: &Message) -> Vec<IpAddr> {
    message
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            RData::A(a) => Some(IpAddr::V4(a.0)),
            RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
            _ => None,
        })
        .collect()
}
