//! Pause port (interface).

use std::time::Duration;

/// Port for the blocking pause between knocks.
///
/// The sequencer awaits each pause before touching the next port, so knock
/// timing is wall-clock serialized.
pub trait PausePort: Send + Sync {
    /// Wait for `duration`.
    fn pause(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
