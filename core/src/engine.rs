//! Port knocker engine - wires the knock service to real sockets.
//!
//! This is the entry point used by the CLI. All run parameters are passed in
//! explicitly; the engine holds no process-wide state.

use std::path::Path;

use tracing::info;

use crate::adapters::{NetSender, TokioPause};
use crate::application::KnockService;
use crate::config::{ConfigLoader, KeySource};
use crate::domain::{KnockConfig, KnockReport, KnockTimings};
use crate::error::Result;

/// The main port knocker.
pub struct PortKnocker {
    service: KnockService<NetSender, TokioPause>,
}

impl PortKnocker {
    /// Create a knocker with default timings.
    pub fn new() -> Self {
        Self::with_timings(KnockTimings::default())
    }

    pub fn with_timings(timings: KnockTimings) -> Self {
        Self {
            service: KnockService::with_timings(
                NetSender::with_timings(timings),
                TokioPause,
                timings,
            ),
        }
    }

    /// Load a (possibly encrypted) configuration file and knock it.
    pub async fn execute(
        &self,
        config_path: &Path,
        key_source: KeySource,
        global_wait: bool,
    ) -> Result<KnockReport> {
        let config = ConfigLoader::new(config_path, key_source).load().await?;
        info!(
            path = %config_path.display(),
            targets = config.len(),
            "Loaded configuration"
        );
        self.execute_config(&config, global_wait).await
    }

    /// Knock an already constructed configuration, e.g. from inline targets.
    pub async fn execute_config(
        &self,
        config: &KnockConfig,
        global_wait: bool,
    ) -> Result<KnockReport> {
        self.service.run(config, global_wait).await
    }
}

impl Default for PortKnocker {
    fn default() -> Self {
        Self::new()
    }
}
