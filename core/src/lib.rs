//! Port Knocker Core Library
//!
//! Sends ordered sequences of TCP/UDP knocks to remote hosts to trigger
//! firewall port-opening rules. Provides functionality to:
//! - Load knock configuration from YAML, optionally encrypted at rest
//! - Build configuration from inline `proto:host:port` targets
//! - Seal and open encrypted configuration envelopes (AES-256-GCM)
//! - Walk targets and ports in order with per-target timing and failure policy
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod engine;
pub mod envelope;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    parse_delay, parse_inline_targets, KnockConfig, KnockFailure, KnockReport, KnockTimings,
    Protocol, Target, TargetReport,
};

// Re-export other commonly used types
pub use application::KnockService;
pub use config::{ConfigLoader, KeySource, KEY_ENV_VAR};
pub use engine::PortKnocker;
pub use error::{Error, Result};
