//! Packet sender port (interface).

use std::time::Duration;

use crate::domain::Protocol;
use crate::error::Result;

/// A single knock to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnockRequest<'a> {
    /// Remote host name or address.
    pub host: &'a str,
    /// Remote port.
    pub port: u16,
    /// Transport.
    pub protocol: Protocol,
    /// Effective wait mode of the target.
    pub wait_connection: bool,
    /// Connect timeout for this send.
    pub timeout: Duration,
    /// Local bind address, `ip:port` or bare `ip`.
    pub gateway: Option<&'a str>,
}

impl KnockRequest<'_> {
    /// `host:port` as used in error messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Port for delivering knock packets.
///
/// Implementations own every socket they open and release it before
/// returning, on success and on every error path.
pub trait PacketSenderPort: Send + Sync {
    /// Send one knock.
    ///
    /// Gateway resolution failures are always returned. Connection failures
    /// are returned when `wait_connection` is set; otherwise the sender falls
    /// back to a best-effort send.
    fn send(&self, knock: &KnockRequest<'_>)
        -> impl std::future::Future<Output = Result<()>> + Send;
}
