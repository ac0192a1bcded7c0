//! Shared types for the POS order engine
//!
//! Common types used across crates: order commands, events, snapshots,
//! ticket bodies and the command response envelope.

pub mod order;

// Re-exports
pub use serde::{Deserialize, Serialize};
