// [libs/infra/discovery/src/socket.rs]
//! Multicast socket setup. Relies on `SO_REUSEADDR`/`SO_REUSEPORT` so
//! multiple processes on one host can both send and receive on the
//! same group/port — on platforms where `SO_REUSEPORT` is unavailable
//! (notably Windows), only `SO_REUSEADDR` is set; a deployment that
//! needs multiple local listeners there should fall back to
//! unicast-per-peer with a bootstrap list instead.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use fabric_shared_errors::FabricError;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use crate::{MULTICAST_GROUP, MULTICAST_PORT};

/// Binds a UDP socket to `0.0.0.0:MULTICAST_PORT`, joins
/// `MULTICAST_GROUP`, and hands it to `tokio` for async use. Multicast
/// loopback is left enabled so a node can observe its own announces
/// for the self-dedup check in the receive loop.
pub fn bind_multicast_socket() -> Result<UdpSocket, FabricError> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|err| FabricError::connection(format!("discovery socket creation failed: {err}")))?;

    socket
        .set_reuse_address(true)
        .map_err(|err| FabricError::connection(format!("SO_REUSEADDR failed: {err}")))?;

    #[cfg(unix)]
    socket
        .set_reuse_port(true)
        .map_err(|err| FabricError::connection(format!("SO_REUSEPORT failed: {err}")))?;

    let bind_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, MULTICAST_PORT);
    socket
        .bind(&bind_addr.into())
        .map_err(|err| FabricError::connection(format!("discovery socket bind failed: {err}")))?;

    socket
        .join_multicast_v4(&MULTICAST_GROUP, &Ipv4Addr::UNSPECIFIED)
        .map_err(|err| FabricError::connection(format!("joining multicast group failed: {err}")))?;

    socket
        .set_multicast_loop_v4(true)
        .map_err(|err| FabricError::connection(format!("enabling multicast loopback failed: {err}")))?;

    socket
        .set_nonblocking(true)
        .map_err(|err| FabricError::connection(format!("setting nonblocking failed: {err}")))?;

    UdpSocket::from_std(socket.into())
        .map_err(|err| FabricError::connection(format!("handing socket to tokio failed: {err}")))
}

pub fn multicast_target() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(MULTICAST_GROUP, MULTICAST_PORT))
}
