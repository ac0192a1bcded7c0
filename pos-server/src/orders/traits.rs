//! Core traits and context for command processing
//!
//! Actions implement [`CommandHandler`]: validate guards, then emit events.
//! Appliers implement [`EventApplier`]: pure snapshot evolution from event
//! data alone. The [`CommandContext`] gives actions transactional reads and
//! buffers modified snapshots until the manager persists them.

use async_trait::async_trait;
use redb::WriteTransaction;
use shared::order::{OrderEvent, OrderSnapshot};
use std::collections::HashMap;
use thiserror::Error;

use super::appliers::{
    BillPrintedApplier, EventAction, ItemDeltaAppliedApplier, KotPrintedApplier,
    OrderCancelledApplier, OrderClosedApplier, PaymentsAddedApplier, TableOpenedApplier,
};
use super::storage::OrderStorage;

/// Domain errors surfaced by command processing
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid item delta: {0}")]
    InvalidDelta(String),

    #[error("Item not found in menu: {0}")]
    ItemNotFound(String),

    #[error("Order is locked for item edits: {0}")]
    OrderLocked(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Payment amount mismatch: expected {expected:.2}, submitted {submitted:.2}")]
    AmountMismatch { expected: f64, submitted: f64 },

    #[error("Nothing to pay on order: {0}")]
    NothingToPay(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Metadata extracted from the command envelope
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_id: String,
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
}

/// Transactional context handed to actions.
///
/// Snapshots saved here are visible to later reads within the same command
/// and are persisted by the manager after all events have been applied.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    current_sequence: u64,
    modified: HashMap<String, OrderSnapshot>,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a OrderStorage, current_sequence: u64) -> Self {
        Self {
            txn,
            storage,
            current_sequence,
            modified: HashMap::new(),
        }
    }

    /// Allocate the next global sequence number
    pub fn next_sequence(&mut self) -> u64 {
        self.current_sequence += 1;
        self.current_sequence
    }

    /// Highest sequence allocated so far in this command
    pub fn current_sequence(&self) -> u64 {
        self.current_sequence
    }

    /// Load an order snapshot, preferring uncommitted modifications
    pub fn load_snapshot(&self, order_id: &str) -> Result<OrderSnapshot, OrderError> {
        if let Some(snapshot) = self.modified.get(order_id) {
            return Ok(snapshot.clone());
        }
        self.storage
            .get_snapshot_txn(self.txn, order_id)
            .map_err(|e| OrderError::Storage(e.to_string()))?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// Create a fresh snapshot (not yet saved)
    pub fn create_snapshot(&self, order_id: String) -> OrderSnapshot {
        OrderSnapshot::new(order_id)
    }

    /// Buffer an updated snapshot for persistence
    pub fn save_snapshot(&mut self, snapshot: OrderSnapshot) {
        self.modified.insert(snapshot.order_id.clone(), snapshot);
    }

    /// Snapshots modified during this command
    pub fn modified_snapshots(&self) -> impl Iterator<Item = &OrderSnapshot> {
        self.modified.values()
    }

    /// Find the order currently occupying a table, if any
    pub fn find_open_order_for_table(&self, table_id: &str) -> Result<Option<String>, OrderError> {
        self.storage
            .find_open_order_for_table_txn(self.txn, table_id)
            .map_err(|e| OrderError::Storage(e.to_string()))
    }
}

/// Command handler - one implementation per command type
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

/// Event applier - pure snapshot evolution from event data
#[enum_dispatch::enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent);
}
