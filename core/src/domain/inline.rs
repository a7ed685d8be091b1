//! Inline target syntax: `proto:host:port[;proto:host:port...]`.

use std::time::Duration;

use super::{KnockConfig, Protocol, Target};
use crate::error::{Error, Result};

/// Parse a duration literal such as `500ms`, `2s` or `1m 30s`.
pub fn parse_delay(value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim()).map_err(|e| Error::InvalidDuration {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Build a configuration from inline targets sharing one delay.
///
/// Every clause becomes a single-port target with `wait_connection = false`
/// and no gateway. Empty clauses are skipped; zero resulting targets is an
/// error.
pub fn parse_inline_targets(targets: &str, delay: &str) -> Result<KnockConfig> {
    let delay = parse_delay(delay)?;

    let targets = targets
        .split(';')
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .map(|clause| parse_clause(clause, delay))
        .collect::<Result<Vec<_>>>()?;

    KnockConfig::new(targets).validate()
}

fn parse_clause(clause: &str, delay: Duration) -> Result<Target> {
    let malformed = |reason: String| Error::MalformedTarget {
        clause: clause.to_string(),
        reason,
    };

    let fields: Vec<&str> = clause.split(':').map(str::trim).collect();
    let [protocol, host, port] = fields[..] else {
        return Err(malformed(
            "expected format [proto]:[host]:[port]".to_string(),
        ));
    };

    // Inline syntax is stricter than config files: lowercase only.
    let protocol = match protocol {
        "tcp" => Protocol::Tcp,
        "udp" => Protocol::Udp,
        other => return Err(malformed(format!("unsupported protocol '{}'", other))),
    };

    let port: i64 = port
        .parse()
        .map_err(|_| malformed(format!("invalid port '{}'", port)))?;
    if !(1..=65535).contains(&port) {
        return Err(malformed(format!(
            "port {} out of range (1-65535)",
            port
        )));
    }

    Ok(Target::single(protocol, host, port as u16, delay))
}
