//! Order Engine Module
//!
//! This module implements order management using event sourcing:
//!
//! - **manager**: Core OrdersManager for command processing and event generation
//! - **storage**: redb-based persistence layer for events, snapshots, and indices
//! - **money**: Decimal totals engine and monetary validation
//! - **tickets**: Running-KOT differ and ticket baseline store
//!
//! # Architecture
//!
//! ```text
//! Command → OrdersManager → Event → Storage (redb)
//!                 ↓                      ↓
//!              Broadcast          Snapshot Update
//!                 ↓
//!           All Subscribers
//! ```
//!
//! # Command Flow
//!
//! 1. Client submits an OrderCommand
//! 2. The matching action validates guards and generates OrderEvents
//! 3. Appliers evolve the OrderSnapshot from the events (pure)
//! 4. Events and snapshots are persisted atomically (redb)
//! 5. Events are broadcast and the NotificationSink is invoked
//! 6. CommandResponse is returned to the client

pub mod actions;
pub mod appliers;
pub mod manager;
pub mod money;
pub mod storage;
pub mod tickets;
pub mod traits;

// Re-exports
pub use manager::{ManagerConfig, OrdersManager};
pub use storage::OrderStorage;
pub use tickets::{InMemoryBaselineStore, TicketBaselineStore};

// Re-export shared types for convenience
pub use shared::order::{
    CommandError, CommandErrorCode, CommandResponse, EventPayload, OrderCommand,
    OrderCommandPayload, OrderEvent, OrderEventType, OrderSnapshot, OrderStatus, TicketBody,
};
