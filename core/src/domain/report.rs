//! Outcome of a knock run.

use serde::Serialize;

use super::{Protocol, Target};

/// A best-effort knock that failed without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnockFailure {
    pub port: u16,
    pub error: String,
}

/// Per-target outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub host: String,
    pub protocol: Protocol,
    /// Effective wait mode after the global override.
    pub wait_connection: bool,
    /// Ports whose knock was sent without error, in order.
    pub sent: Vec<u16>,
    pub failures: Vec<KnockFailure>,
}

impl TargetReport {
    pub fn new(target: &Target, protocol: Protocol, wait_connection: bool) -> Self {
        Self {
            host: target.host.clone(),
            protocol,
            wait_connection,
            sent: Vec::with_capacity(target.ports.len()),
            failures: Vec::new(),
        }
    }
}

/// Outcome of a completed run. Aborted runs return an error instead.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct KnockReport {
    pub targets: Vec<TargetReport>,
}

impl KnockReport {
    /// Number of knocks sent without error.
    pub fn sent(&self) -> usize {
        self.targets.iter().map(|t| t.sent.len()).sum()
    }

    /// Number of tolerated failures.
    pub fn failed(&self) -> usize {
        self.targets.iter().map(|t| t.failures.len()).sum()
    }
}

impl std::fmt::Display for KnockReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} targets, {} knocks sent, {} failed",
            self.targets.len(),
            self.sent(),
            self.failed()
        )
    }
}
