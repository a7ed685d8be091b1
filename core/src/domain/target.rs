//! Knock target domain models.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Protocol
// ============================================================================

/// Transport used to deliver a knock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// TCP connect attempt.
    Tcp,
    /// Zero-length UDP datagram.
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl FromStr for Protocol {
    type Err = Error;

    /// Case-insensitive: `TCP`, `tcp` and `Tcp` are all accepted.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            _ => Err(Error::UnsupportedProtocol(s.to_string())),
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// KnockTimings
// ============================================================================

/// Timing constants of a knock run.
///
/// Defaults match the historical hard-coded values and should only be
/// changed when the remote firewall is known to need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnockTimings {
    /// Lower bound for the per-send connect timeout.
    pub min_send_timeout: Duration,
    /// Connect timeout of the best-effort TCP fallback.
    pub fallback_connect_timeout: Duration,
}

impl Default for KnockTimings {
    fn default() -> Self {
        Self {
            min_send_timeout: Duration::from_millis(100),
            fallback_connect_timeout: Duration::from_millis(100),
        }
    }
}

// ============================================================================
// Target
// ============================================================================

/// One host plus its ordered port sequence and per-host policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Host name or address, resolved at dial time.
    pub host: String,
    /// Ports knocked in order. Repeats are allowed.
    #[serde(default)]
    pub ports: Vec<u16>,
    /// Raw protocol text. Validated only when the target is knocked.
    #[serde(default)]
    pub protocol: String,
    /// Pause after every port except the last one.
    #[serde(default, with = "humantime_serde")]
    pub delay: Duration,
    /// Abort the whole run if a knock on this target fails.
    #[serde(default)]
    pub wait_connection: bool,
    /// Local bind address, `ip:port` or bare `ip`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}

impl Target {
    /// Create a target knocking a single port, as produced by inline syntax.
    pub fn single(protocol: Protocol, host: impl Into<String>, port: u16, delay: Duration) -> Self {
        Self {
            host: host.into(),
            ports: vec![port],
            protocol: protocol.as_str().to_string(),
            delay,
            wait_connection: false,
            gateway: None,
        }
    }

    /// Parse the protocol field.
    pub fn protocol(&self) -> Result<Protocol> {
        self.protocol.parse()
    }

    /// Gateway binding, with an empty string meaning none.
    pub fn gateway(&self) -> Option<&str> {
        self.gateway.as_deref().filter(|g| !g.is_empty())
    }

    /// Effective wait mode: a global `true` upgrades, a local `true` is never
    /// downgraded.
    pub fn waits_for_connection(&self, global_wait: bool) -> bool {
        self.wait_connection || global_wait
    }

    /// Per-send timeout: half the delay, never below `floor`.
    pub fn send_timeout(&self, floor: Duration) -> Duration {
        (self.delay / 2).max(floor)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:?} ({})", self.host, self.ports, self.protocol)
    }
}

// ============================================================================
// KnockConfig
// ============================================================================

/// Ordered list of targets. Knocks execute in listed order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KnockConfig {
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl KnockConfig {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    /// Check the invariants a loaded configuration must hold.
    pub fn validate(self) -> Result<Self> {
        if self.targets.is_empty() {
            return Err(Error::Parse("no valid targets".to_string()));
        }
        for target in &self.targets {
            if target.ports.contains(&0) {
                return Err(Error::Parse(format!(
                    "target {} has port 0, ports must be in 1-65535",
                    target.host
                )));
            }
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(delay_ms: u64, wait: bool) -> Target {
        Target {
            host: "10.0.0.1".into(),
            ports: vec![7000, 8000],
            protocol: "TCP".into(),
            delay: Duration::from_millis(delay_ms),
            wait_connection: wait,
            gateway: Some(String::new()),
        }
    }

    #[test]
    fn test_protocol_case_insensitive() {
        assert_eq!("Tcp".parse::<Protocol>().unwrap(), Protocol::Tcp);
        assert_eq!("UDP".parse::<Protocol>().unwrap(), Protocol::Udp);
        assert!(matches!(
            "icmp".parse::<Protocol>(),
            Err(Error::UnsupportedProtocol(p)) if p == "icmp"
        ));
    }

    #[test]
    fn test_send_timeout_floor() {
        let floor = KnockTimings::default().min_send_timeout;
        assert_eq!(target(0, false).send_timeout(floor), Duration::from_millis(100));
        assert_eq!(target(150, false).send_timeout(floor), Duration::from_millis(100));
        assert_eq!(target(1000, false).send_timeout(floor), Duration::from_millis(500));
    }

    #[test]
    fn test_wait_is_one_way_upgrade() {
        assert!(!target(0, false).waits_for_connection(false));
        assert!(target(0, false).waits_for_connection(true));
        assert!(target(0, true).waits_for_connection(false));
        assert!(target(0, true).waits_for_connection(true));
    }

    #[test]
    fn test_empty_gateway_is_none() {
        assert_eq!(target(0, false).gateway(), None);
        let mut t = target(0, false);
        t.gateway = Some("192.168.1.10".into());
        assert_eq!(t.gateway(), Some("192.168.1.10"));
    }

    #[test]
    fn test_validate() {
        assert!(matches!(KnockConfig::default().validate(), Err(Error::Parse(_))));

        let mut bad = target(0, false);
        bad.ports.push(0);
        assert!(KnockConfig::new(vec![bad]).validate().is_err());

        let ok = KnockConfig::new(vec![target(0, false)]).validate().unwrap();
        assert_eq!(ok.len(), 1);
    }
}
