//! Network packet sender.
//!
//! Knocks are ordinary connects and sends: a TCP connection attempt or a
//! zero-length UDP datagram. The payload is empty; the packet itself is the
//! signal.

mod tcp;
mod udp;

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::{lookup_host, TcpStream, UdpSocket};
use tracing::debug;

use crate::domain::{KnockTimings, Protocol};
use crate::error::{Error, Result};
use crate::ports::{KnockRequest, PacketSenderPort};

/// Sends knocks over real sockets.
#[derive(Debug, Clone, Default)]
pub struct NetSender {
    timings: KnockTimings,
}

impl NetSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timings(timings: KnockTimings) -> Self {
        Self { timings }
    }

    /// Resolve, connect and knock in wait-for-connection order.
    async fn send_connected(
        &self,
        knock: &KnockRequest<'_>,
        local: Option<SocketAddr>,
    ) -> Result<()> {
        let addr = knock.address();

        let conn = match dial(knock, local, knock.timeout).await {
            Ok(conn) => conn,
            Err(source) if knock.wait_connection => return Err(Error::Dial { addr, source }),
            Err(source) => {
                debug!(addr = %addr, error = %source, "Connect failed, falling back to best-effort send");
                return self.send_best_effort(knock, local).await;
            }
        };

        conn.knock().await.map_err(|source| Error::Write { addr, source })
    }

    /// Fire-and-forget path used when the target does not wait.
    ///
    /// UDP sends without a timeout and reports local failures. TCP connect
    /// failures are expected (closed ports) and swallowed; only a failed
    /// write after a successful connect is reported.
    async fn send_best_effort(
        &self,
        knock: &KnockRequest<'_>,
        local: Option<SocketAddr>,
    ) -> Result<()> {
        let addr = knock.address();

        match knock.protocol {
            Protocol::Udp => {
                let socket = async {
                    let remote = resolve_remote(knock.host, knock.port, local).await?;
                    udp::connect(remote, local).await
                }
                .await
                .map_err(|source| Error::Dial {
                    addr: addr.clone(),
                    source,
                })?;
                udp::knock(socket)
                    .await
                    .map_err(|source| Error::Write { addr, source })
            }
            Protocol::Tcp => {
                let timeout = self.timings.fallback_connect_timeout;
                match dial(knock, local, timeout).await {
                    Ok(conn) => conn.knock().await.map_err(|source| Error::Write { addr, source }),
                    Err(e) => {
                        debug!(addr = %addr, error = %e, "TCP connect ignored in best-effort mode");
                        Ok(())
                    }
                }
            }
        }
    }
}

impl PacketSenderPort for NetSender {
    async fn send(&self, knock: &KnockRequest<'_>) -> Result<()> {
        let local = match knock.gateway {
            Some(gateway) => Some(resolve_gateway(gateway).await?),
            None => None,
        };

        debug!(
            addr = %knock.address(),
            protocol = %knock.protocol,
            local = ?local,
            timeout = ?knock.timeout,
            "Sending knock"
        );

        self.send_connected(knock, local).await
    }
}

/// An open connection, released when consumed.
enum Connection {
    Tcp(TcpStream),
    Udp(UdpSocket),
}

impl Connection {
    async fn knock(self) -> io::Result<()> {
        match self {
            Connection::Tcp(stream) => tcp::knock(stream).await,
            Connection::Udp(socket) => udp::knock(socket).await,
        }
    }
}

/// Resolve and connect within `timeout`.
async fn dial(
    knock: &KnockRequest<'_>,
    local: Option<SocketAddr>,
    timeout: Duration,
) -> io::Result<Connection> {
    let connect = async {
        let remote = resolve_remote(knock.host, knock.port, local).await?;
        match knock.protocol {
            Protocol::Tcp => tcp::connect(remote, local).await.map(Connection::Tcp),
            Protocol::Udp => udp::connect(remote, local).await.map(Connection::Udp),
        }
    };

    match tokio::time::timeout(timeout, connect).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("connect timed out after {:?}", timeout),
        )),
    }
}

/// Resolve a gateway into a local bind address.
///
/// A bare IP (v4 or v6) or a bare host name binds an ephemeral port; anything
/// else containing a colon is taken as `host:port`.
pub async fn resolve_gateway(gateway: &str) -> Result<SocketAddr> {
    let gateway_error = |source: io::Error| Error::Gateway {
        gateway: gateway.to_string(),
        source,
    };

    if let Ok(ip) = gateway.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, 0));
    }

    let with_port = if gateway.contains(':') {
        gateway.to_string()
    } else {
        format!("{}:0", gateway)
    };

    let mut addrs = lookup_host(with_port.as_str())
        .await
        .map_err(gateway_error)?;
    addrs.next().ok_or_else(|| {
        gateway_error(io::Error::new(
            io::ErrorKind::NotFound,
            "no addresses found",
        ))
    })
}

/// Resolve the remote endpoint, preferring the gateway's address family.
async fn resolve_remote(
    host: &str,
    port: u16,
    local: Option<SocketAddr>,
) -> io::Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port)).await?.collect();

    let preferred = local.and_then(|local| {
        addrs
            .iter()
            .find(|addr| addr.is_ipv4() == local.is_ipv4())
            .copied()
    });

    preferred.or_else(|| addrs.first().copied()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses found for {}", host),
        )
    })
}
