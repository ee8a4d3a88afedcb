#![allow(dead_code)]
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA, NS, SOA};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// How the mock server treats incoming queries.
#[derive(Debug, Clone, Copy)]
pub enum ServerMode {
    Answer,
    /// Never replies.
    Silent,
    /// Replies twice to every query.
    Duplicate,
    /// Sends a garbage datagram before every real reply.
    Garbage,
    /// Ignores the first `n` queries, then answers.
    DropFirst(usize),
    /// Answers after a delay.
    Delay(Duration),
}

/// Records served by a [`MockDnsServer`], keyed by lower-case name and type.
#[derive(Default, Clone)]
pub struct RecordTable {
    records: HashMap<(String, RecordType), Vec<RData>>,
    rcodes: HashMap<String, ResponseCode>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, name: &str, record_type: RecordType, rdata: RData) -> Self {
        self.records
            .entry((name.to_ascii_lowercase(), record_type))
            .or_default()
            .push(rdata);
        self
    }

    pub fn ns(self, zone: &str, nameserver: &str) -> Self {
        self.push(zone, RecordType::NS, RData::NS(NS(name(nameserver))))
    }

    pub fn soa(self, zone: &str, primary: &str) -> Self {
        let soa = SOA::new(
            name(primary),
            name(&format!("hostmaster.{}", zone)),
            1,
            3600,
            600,
            86400,
            300,
        );
        self.push(zone, RecordType::SOA, RData::SOA(soa))
    }

    pub fn a(self, host: &str, addr: &str) -> Self {
        match addr.parse::<IpAddr>() {
            Ok(IpAddr::V4(v4)) => self.push(host, RecordType::A, RData::A(A(v4))),
            _ => panic!("not an IPv4 address: {}", addr),
        }
    }

    pub fn aaaa(self, host: &str, addr: &str) -> Self {
        match addr.parse::<IpAddr>() {
            Ok(IpAddr::V6(v6)) => self.push(host, RecordType::AAAA, RData::AAAA(AAAA(v6))),
            _ => panic!("not an IPv6 address: {}", addr),
        }
    }

    pub fn rcode(mut self, name: &str, rcode: ResponseCode) -> Self {
        self.rcodes.insert(name.to_ascii_lowercase(), rcode);
        self
    }

    fn answer(&self, query: &Message) -> Option<Vec<u8>> {
        let question = query.queries().first()?;
        let qname = question.name().to_ascii().to_ascii_lowercase();

        let mut response = Message::new();
        response
            .set_id(query.id())
            .set_message_type(MessageType::Response)
            .set_op_code(query.op_code())
            .set_recursion_desired(query.recursion_desired())
            .set_recursion_available(true)
            .add_query(question.clone());

        match self.rcodes.get(&qname) {
            Some(rcode) => {
                response.set_response_code(*rcode);
            }
            None => {
                if let Some(rdatas) = self.records.get(&(qname, question.query_type())) {
                    for rdata in rdatas {
                        response.add_answer(Record::from_rdata(
                            question.name().clone(),
                            300,
                            rdata.clone(),
                        ));
                    }
                }
            }
        }

        let mut bytes = Vec::with_capacity(512);
        response.emit(&mut BinEncoder::new(&mut bytes)).ok()?;
        Some(bytes)
    }
}

fn name(s: &str) -> Name {
    Name::from_ascii(s).unwrap()
}

/// Loopback UDP DNS server answering from a [`RecordTable`].
pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(table: RecordTable, mode: ServerMode) -> Result<Self, std::io::Error> {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await?);
        let addr = socket.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&queries);
        let table = Arc::new(table);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        let count = seen.fetch_add(1, Ordering::SeqCst) + 1;
                        let Ok(query) = Message::from_vec(&buf[..len]) else { continue };
                        let Some(reply) = table.answer(&query) else { continue };

                        match mode {
                            ServerMode::Answer => {
                                let _ = socket.send_to(&reply, peer).await;
                            }
                            ServerMode::Silent => {}
                            ServerMode::Duplicate => {
                                let _ = socket.send_to(&reply, peer).await;
                                let _ = socket.send_to(&reply, peer).await;
                            }
                            ServerMode::Garbage => {
                                let _ = socket.send_to(&[0xde, 0xad, 0xbe, 0xef], peer).await;
                                let _ = socket.send_to(&reply, peer).await;
                            }
                            ServerMode::DropFirst(n) => {
                                if count > n {
                                    let _ = socket.send_to(&reply, peer).await;
                                }
                            }
                            ServerMode::Delay(delay) => {
                                let socket = Arc::clone(&socket);
                                tokio::spawn(async move {
                                    tokio::time::sleep(delay).await;
                                    let _ = socket.send_to(&reply, peer).await;
                                });
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Datagrams received so far, retransmissions included.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
