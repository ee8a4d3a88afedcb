use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::debug;

const RECV_BUFFER_SIZE: usize = 1024 * 1024;
const SEND_BUFFER_SIZE: usize = 256 * 1024;

/// Binds the single UDP socket every query goes through.
///
/// IPv4-only upstream sets get a plain `0.0.0.0:0` socket. Anything else
/// gets a dual-stack `[::]:0` socket, and IPv4 destinations must then be
/// passed through [`destination_for`].
pub async fn bind_for(upstreams: &[SocketAddr]) -> io::Result<UdpSocket> {
    let dual_stack = upstreams.iter().any(SocketAddr::is_ipv6);

    let (domain, bind_addr) = if dual_stack {
        (
            Domain::IPV6,
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        )
    } else {
        (
            Domain::IPV4,
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        )
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if dual_stack {
        socket.set_only_v6(false)?;
    }
    socket.set_recv_buffer_size(RECV_BUFFER_SIZE)?;
    socket.set_send_buffer_size(SEND_BUFFER_SIZE)?;
    socket.bind(&bind_addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    let socket = UdpSocket::from_std(std_socket)?;
    debug!(local = ?socket.local_addr().ok(), dual_stack, "UDP socket bound");
    Ok(socket)
}

/// Maps an IPv4 destination to its IPv4-mapped IPv6 form when the local
/// socket is IPv6.
pub fn destination_for(local: SocketAddr, destination: SocketAddr) -> SocketAddr {
    match (local, destination) {
        (SocketAddr::V6(_), SocketAddr::V4(v4)) => {
            SocketAddr::new(IpAddr::V6(v4.ip().to_ipv6_mapped()), v4.port())
        }
        _ => destination,
    }
}

/// Undoes [`destination_for`] on a received source address.
pub fn canonical_source(from: SocketAddr) -> SocketAddr {
    SocketAddr::new(from.ip().to_canonical(), from.port())
}
