//! Multiplexed DNS-over-UDP client.
//!
//! Every query shares one socket. A background receive loop parses each
//! datagram and hands it to the caller waiting on the same
//! (transaction id, question) tuple.

use super::codec::MessageCodec;
use super::socket::{canonical_source, destination_for};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hickory_proto::op::{Message, MessageType, Query};
use nsgeo_domain::QueryError;
use rustc_hash::FxBuildHasher;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

const MAX_DATAGRAM_SIZE: usize = 65_535;
const CLIENT_CLOSED: &str = "client closed";

#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    /// Upper bound for one query, retransmissions included.
    pub timeout: Duration,
    pub retransmit_interval: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retransmit_interval: Duration::from_secs(1),
        }
    }
}

/// A parsed response and the address it came from.
#[derive(Debug, Clone)]
pub struct Response {
    pub from: SocketAddr,
    pub message: Message,
}

type QueryTuple = (u16, Query);

struct ClientInner {
    socket: UdpSocket,
    local_addr: SocketAddr,
    codec: MessageCodec,
    options: ClientOptions,
    pending: DashMap<QueryTuple, mpsc::Sender<Response>, FxBuildHasher>,
    next_qid: AtomicU32,
    closed: CancellationToken,
    close_reason: OnceLock<String>,
}

impl ClientInner {
    fn close_with(&self, cause: String) {
        if self.close_reason.set(cause).is_ok() {
            debug!(
                cause = self.close_reason.get().map(String::as_str).unwrap_or_default(),
                pending = self.pending.len(),
                "DNS client closed"
            );
        }
        self.closed.cancel();
    }

    fn closed_error(&self) -> QueryError {
        QueryError::Closed(
            self.close_reason
                .get()
                .cloned()
                .unwrap_or_else(|| CLIENT_CLOSED.to_string()),
        )
    }

    fn deliver(&self, datagram: &[u8], from: SocketAddr) {
        let message = match self.codec.parse(datagram) {
            Ok(message) => message,
            Err(e) => {
                trace!(from = %from, error = %e, "Dropping unparsable datagram");
                return;
            }
        };

        if message.message_type() != MessageType::Response {
            trace!(from = %from, "Dropping non-response datagram");
            return;
        }

        let question = match message.queries() {
            [question] => question.clone(),
            other => {
                trace!(from = %from, questions = other.len(), "Dropping response without exactly one question");
                return;
            }
        };

        let tuple = (message.id(), question);
        let Some(tx) = self.pending.get(&tuple).map(|entry| entry.value().clone()) else {
            trace!(from = %from, id = tuple.0, "No pending query for response");
            return;
        };

        let response = Response {
            from: canonical_source(from),
            message,
        };
        if tx.try_send(response).is_err() {
            trace!(from = %from, id = tuple.0, "Dropping duplicate response");
        }
    }
}

/// Removes a pending entry on every exit path of a query.
struct Registration {
    inner: Arc<ClientInner>,
    tuple: QueryTuple,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.inner.pending.remove(&self.tuple);
    }
}

/// Closes the transport once the last `DnsClient` clone is gone.
struct ClientHandle {
    inner: Arc<ClientInner>,
}

impl Drop for ClientHandle {
    fn drop(&mut self) {
        self.inner.close_with(CLIENT_CLOSED.to_string());
    }
}

#[derive(Clone)]
pub struct DnsClient {
    handle: Arc<ClientHandle>,
}

impl DnsClient {
    /// Wraps an already bound socket and starts the receive loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(socket: UdpSocket, codec: MessageCodec, options: ClientOptions) -> io::Result<Self> {
        let local_addr = socket.local_addr()?;
        let inner = Arc::new(ClientInner {
            socket,
            local_addr,
            codec,
            options,
            pending: DashMap::with_hasher(FxBuildHasher),
            next_qid: AtomicU32::new(fastrand::u32(..)),
            closed: CancellationToken::new(),
            close_reason: OnceLock::new(),
        });

        tokio::spawn(receive_loop(Arc::clone(&inner)));

        Ok(Self {
            handle: Arc::new(ClientHandle { inner }),
        })
    }

    fn inner(&self) -> &Arc<ClientInner> {
        &self.handle.inner
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.inner().local_addr
    }

    pub fn codec(&self) -> &MessageCodec {
        &self.inner().codec
    }

    /// Wrapping 16-bit counter. Keeps collisions rare, not impossible.
    pub fn next_transaction_id(&self) -> u16 {
        self.inner().next_qid.fetch_add(1, Ordering::Relaxed) as u16
    }

    /// Queries currently waiting for a response.
    pub fn pending_queries(&self) -> usize {
        self.inner().pending.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner().closed.is_cancelled()
    }

    /// Fails every outstanding and future query. Idempotent.
    pub fn close(&self) {
        self.inner().close_with(CLIENT_CLOSED.to_string());
    }

    /// Sends `message` to `destination` and waits for the matching response.
    ///
    /// The query is resent every retransmit interval until a response
    /// arrives, the overall timeout elapses, the client closes or `cancel`
    /// fires.
    pub async fn query(
        &self,
        message: &Message,
        destination: SocketAddr,
        cancel: &CancellationToken,
    ) -> Result<Response, QueryError> {
        let question = match message.queries() {
            [question] => question.clone(),
            _ => return Err(QueryError::InvalidQuestion),
        };

        let inner = self.inner();
        if inner.closed.is_cancelled() {
            return Err(inner.closed_error());
        }

        let (_registration, mut rx) = self.register((message.id(), question))?;
        let packed = inner.codec.pack(message)?;
        let destination = destination_for(inner.local_addr, destination);

        let options = inner.options;
        let deadline = tokio::time::sleep(options.timeout);
        tokio::pin!(deadline);
        let mut retransmit = tokio::time::interval_at(
            Instant::now() + options.retransmit_interval,
            options.retransmit_interval,
        );
        retransmit.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            inner
                .socket
                .send_to(&packed, destination)
                .await
                .map_err(|e| QueryError::Send(e.to_string()))?;
            trace!(id = message.id(), server = %destination, attempt, "Query sent");

            tokio::select! {
                biased;
                _ = inner.closed.cancelled() => return Err(inner.closed_error()),
                _ = cancel.cancelled() => return Err(QueryError::Cancelled),
                response = rx.recv() => {
                    return response.ok_or_else(|| inner.closed_error());
                }
                _ = &mut deadline => {
                    debug!(id = message.id(), server = %destination, attempt, "Query timed out");
                    return Err(QueryError::Timeout);
                }
                _ = retransmit.tick() => {}
            }
        }
    }

    fn register(
        &self,
        tuple: QueryTuple,
    ) -> Result<(Registration, mpsc::Receiver<Response>), QueryError> {
        let inner = self.inner();
        let rx = match inner.pending.entry(tuple.clone()) {
            Entry::Occupied(_) => return Err(QueryError::Collision),
            Entry::Vacant(slot) => {
                let (tx, rx) = mpsc::channel(1);
                slot.insert(tx);
                rx
            }
        };
        Ok((
            Registration {
                inner: Arc::clone(inner),
                tuple,
            },
            rx,
        ))
    }
}

async fn receive_loop(inner: Arc<ClientInner>) {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

    loop {
        let received = tokio::select! {
            _ = inner.closed.cancelled() => break,
            received = inner.socket.recv_from(&mut buf) => received,
        };

        match received {
            Ok((len, from)) => inner.deliver(&buf[..len], from),
            // ICMP errors surface here on some platforms; they belong to
            // one destination, not to the socket.
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset
                ) =>
            {
                trace!(error = %e, "Ignoring ICMP error on DNS socket");
            }
            Err(e) => {
                warn!(error = %e, "DNS socket read failed, closing client");
                inner.close_with(format!("socket read failed, {}", e));
                // The socket is released with the last `ClientInner`; every
                // send path checks `closed` first, so nothing uses it again.
                break;
            }
        }
    }

    debug!("DNS receive loop stopped");
}
