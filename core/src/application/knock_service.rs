//! Knock sequencing application service.

use tracing::{debug, info, warn};

use crate::domain::{KnockConfig, KnockFailure, KnockReport, KnockTimings, Target, TargetReport};
use crate::error::{Error, Result};
use crate::ports::{KnockRequest, PacketSenderPort, PausePort};

/// Application service that walks targets and ports in order.
///
/// Execution is strictly sequential: one send at a time, pauses awaited in
/// place. The only branch is abort-vs-continue on a failed send.
pub struct KnockService<S: PacketSenderPort, P: PausePort> {
    sender: S,
    pause: P,
    timings: KnockTimings,
}

impl<S: PacketSenderPort, P: PausePort> KnockService<S, P> {
    /// Create a new knock service with default timings.
    pub fn new(sender: S, pause: P) -> Self {
        Self::with_timings(sender, pause, KnockTimings::default())
    }

    pub fn with_timings(sender: S, pause: P, timings: KnockTimings) -> Self {
        Self {
            sender,
            pause,
            timings,
        }
    }

    /// Knock every target in order.
    ///
    /// `global_wait` can only upgrade a target to wait mode. In wait mode the
    /// first failed send aborts the run; otherwise failures are recorded and
    /// the sequence continues. Misconfiguration (bad protocol, unresolvable
    /// gateway) always aborts.
    pub async fn run(&self, config: &KnockConfig, global_wait: bool) -> Result<KnockReport> {
        let total = config.len();
        info!(targets = total, "Starting knock sequence");

        let mut report = KnockReport::default();
        for (index, target) in config.targets.iter().enumerate() {
            info!(
                index = index + 1,
                total,
                host = %target.host,
                ports = ?target.ports,
                protocol = %target.protocol,
                "Knocking target"
            );

            let target_report = self
                .knock_target(target, global_wait)
                .await
                .map_err(|source| Error::Knock {
                    host: target.host.clone(),
                    source: Box::new(source),
                })?;
            report.targets.push(target_report);
        }

        info!(sent = report.sent(), failed = report.failed(), "Knock sequence completed");
        Ok(report)
    }

    async fn knock_target(&self, target: &Target, global_wait: bool) -> Result<TargetReport> {
        let protocol = target.protocol()?;
        let wait_connection = target.waits_for_connection(global_wait);
        let timeout = target.send_timeout(self.timings.min_send_timeout);

        let mut report = TargetReport::new(target, protocol, wait_connection);
        let last = target.ports.len().saturating_sub(1);

        for (i, &port) in target.ports.iter().enumerate() {
            let knock = KnockRequest {
                host: &target.host,
                port,
                protocol,
                wait_connection,
                timeout,
                gateway: target.gateway(),
            };

            match self.sender.send(&knock).await {
                Ok(()) => {
                    debug!(host = %target.host, port, %protocol, "Knock sent");
                    report.sent.push(port);
                }
                Err(e) if wait_connection || e.is_misconfiguration() => return Err(e),
                Err(e) => {
                    warn!(host = %target.host, port, error = %e, "Knock failed, continuing");
                    report.failures.push(KnockFailure {
                        port,
                        error: e.to_string(),
                    });
                }
            }

            if i < last && !target.delay.is_zero() {
                debug!(delay = ?target.delay, "Waiting before next knock");
                self.pause.pause(target.delay).await;
            }
        }

        Ok(report)
    }
}
