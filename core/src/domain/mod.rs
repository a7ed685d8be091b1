//! Domain layer - Pure business logic and data models.
//!
//! This module contains the knock configuration model, the inline target
//! parser and the run report. These types have no I/O dependencies and can
//! be tested in isolation.

mod inline;
mod report;
mod target;

// Re-export all domain types
pub use inline::{parse_delay, parse_inline_targets};
pub use report::{KnockFailure, KnockReport, TargetReport};
pub use target::{KnockConfig, KnockTimings, Protocol, Target};
