//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with the network and the clock. Implementations live in
//! `adapters`.

mod pause;
mod sender;

pub use pause::PausePort;
pub use sender::{KnockRequest, PacketSenderPort};
