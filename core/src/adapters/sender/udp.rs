//! Connected UDP socket with optional local bind.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

pub(super) async fn connect(remote: SocketAddr, local: Option<SocketAddr>) -> io::Result<UdpSocket> {
    let local = local.unwrap_or_else(|| match remote {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    });
    let socket = UdpSocket::bind(local).await?;
    socket.connect(remote).await?;
    Ok(socket)
}

/// Send a zero-length datagram. Delivery is not confirmed.
pub(super) async fn knock(socket: UdpSocket) -> io::Result<()> {
    socket.send(&[]).await?;
    Ok(())
}
