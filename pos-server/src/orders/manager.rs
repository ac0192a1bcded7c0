//! OrdersManager - Core command processing and event generation
//!
//! This module handles:
//! - Command validation and processing
//! - Event generation with global sequence numbers
//! - Persistence to redb (transactional)
//! - Snapshot updates
//! - Event broadcasting and notification callbacks
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. OpenTable: reuse pre-check (idempotent open)
//!     ├─ 2. PrintBill: pre-generate bill number
//!     ├─ 3. Begin write transaction
//!     ├─ 4. Create CommandContext
//!     ├─ 5. Convert command to action and execute
//!     ├─ 6. Apply events to snapshots via EventApplier
//!     ├─ 7. Persist events and snapshots
//!     ├─ 8. Commit transaction
//!     ├─ 9. Ticket baseline maintenance
//!     ├─ 10. Broadcast event(s) / notify sink
//!     └─ 11. Return response
//! ```
//!
//! A failed command leaves storage untouched: events and snapshots only
//! persist when the transaction commits.

use super::actions::CommandAction;
use super::appliers::EventAction;
use super::storage::{OrderStorage, StorageError};
use super::tickets::{self, InMemoryBaselineStore, TicketBaselineStore};
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier, OrderError};
use crate::notify::{NotificationSink, TracingSink};
use crate::services::menu::MenuCatalog;
use chrono::Local;
use shared::order::{
    ChargePolicy, CommandError, CommandErrorCode, CommandResponse, OrderCommand, OrderEvent,
    OrderSnapshot, OrderStatus, TicketBody,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

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

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Map a storage failure to an error code (the client localizes the message)
fn classify_storage_error(e: &StorageError) -> CommandErrorCode {
    // Exact matches on enum variants first
    match e {
        StorageError::Serialization(_) => return CommandErrorCode::InternalError,
        StorageError::OrderNotFound(_) => return CommandErrorCode::OrderNotFound,
        _ => {}
    }

    // redb errors are classified by string matching
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc") {
        return CommandErrorCode::StorageFull;
    }

    if err_str.contains("out of memory") || err_str.contains("cannot allocate") {
        return CommandErrorCode::OutOfMemory;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return CommandErrorCode::StorageCorrupted;
    }

    CommandErrorCode::SystemBusy
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                let message = e.to_string();
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                (code, message)
            }
            ManagerError::OrderNotFound(id) => (
                CommandErrorCode::OrderNotFound,
                format!("Order not found: {}", id),
            ),
            ManagerError::InvalidDelta(msg) => (CommandErrorCode::InvalidDelta, msg),
            ManagerError::ItemNotFound(id) => (
                CommandErrorCode::ItemNotFound,
                format!("Item not found in menu: {}", id),
            ),
            ManagerError::OrderLocked(id) => (
                CommandErrorCode::OrderLocked,
                format!("Order is locked for item edits: {}", id),
            ),
            ManagerError::InvalidState(msg) => (CommandErrorCode::InvalidState, msg),
            ManagerError::AmountMismatch { expected, submitted } => (
                CommandErrorCode::AmountMismatch,
                format!(
                    "Payment amount mismatch: expected {:.2}, submitted {:.2}",
                    expected, submitted
                ),
            ),
            ManagerError::NothingToPay(id) => (
                CommandErrorCode::NothingToPay,
                format!("Nothing to pay on order: {}", id),
            ),
            ManagerError::Internal(msg) => (CommandErrorCode::InternalError, msg),
        };
        CommandError::new(code, message)
    }
}

impl From<OrderError> for ManagerError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(id) => ManagerError::OrderNotFound(id),
            OrderError::InvalidDelta(msg) => ManagerError::InvalidDelta(msg),
            OrderError::ItemNotFound(id) => ManagerError::ItemNotFound(id),
            OrderError::OrderLocked(id) => ManagerError::OrderLocked(id),
            OrderError::InvalidState(msg) => ManagerError::InvalidState(msg),
            OrderError::AmountMismatch { expected, submitted } => {
                ManagerError::AmountMismatch { expected, submitted }
            }
            OrderError::NothingToPay(id) => ManagerError::NothingToPay(id),
            OrderError::Storage(msg) => ManagerError::Internal(msg),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 65536;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Whether the item ledger freezes once the order is billed.
    /// Enabled by default to prevent bill/kitchen-ticket drift.
    pub lock_items_after_bill: bool,
    /// Tax/discount rates frozen into each order at open time
    pub charge_policy: ChargePolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            lock_items_after_bill: true,
            charge_policy: ChargePolicy::default(),
        }
    }
}

/// OrdersManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect engine restarts and refetch state wholesale.
pub struct OrdersManager {
    storage: OrderStorage,
    event_tx: broadcast::Sender<OrderEvent>,
    /// Engine instance epoch - unique ID generated on startup
    epoch: String,
    config: ManagerConfig,
    /// Menu lookup for resolving item snapshots at first add
    catalog: Arc<dyn MenuCatalog>,
    /// Running-ticket baselines, local to this engine instance
    baselines: Arc<dyn TicketBaselineStore>,
    /// Success/failure callbacks for the UI layer
    sink: Arc<dyn NotificationSink>,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .field("config", &self.config)
            .finish()
    }
}

impl OrdersManager {
    /// Create a new OrdersManager with the given database path
    pub fn new(db_path: impl AsRef<Path>, catalog: Arc<dyn MenuCatalog>) -> ManagerResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        Ok(Self::from_parts(storage, catalog))
    }

    /// Create an OrdersManager with existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(storage: OrderStorage, catalog: Arc<dyn MenuCatalog>) -> Self {
        Self::from_parts(storage, catalog)
    }

    fn from_parts(storage: OrderStorage, catalog: Arc<dyn MenuCatalog>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "OrdersManager started with new epoch");
        Self {
            storage,
            event_tx,
            epoch,
            config: ManagerConfig::default(),
            catalog,
            baselines: Arc::new(InMemoryBaselineStore::new()),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the engine configuration
    pub fn set_config(&mut self, config: ManagerConfig) {
        self.config = config;
    }

    /// Replace the ticket baseline store
    pub fn set_baseline_store(&mut self, baselines: Arc<dyn TicketBaselineStore>) {
        self.baselines = baselines;
    }

    /// Replace the notification sink
    pub fn set_notification_sink(&mut self, sink: Arc<dyn NotificationSink>) {
        self.sink = sink;
    }

    /// Get the engine epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Generate next bill number (crash-safe via redb)
    fn next_bill_number(&self) -> ManagerResult<String> {
        let count = self.storage.next_bill_count()?;
        let date_str = Local::now().format("%Y%m%d").to_string();
        Ok(format!("BILL{}{}", date_str, 10000 + count))
    }

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: OrderCommand) -> CommandResponse {
        match self.process_command(cmd.clone()) {
            Ok((response, events)) => {
                // Broadcast and notify after successful commit
                for event in &events {
                    self.sink.notify_event(event);
                    let _ = self.event_tx.send(event.clone());
                }
                response
            }
            Err(err) => {
                let error: CommandError = err.into();
                self.sink.notify_failure(&cmd.command_id, &error);
                CommandResponse::error(cmd.command_id, error)
            }
        }
    }

    /// Process command and return response with events
    ///
    /// Uses the action-based architecture:
    /// 1. Convert command to CommandAction
    /// 2. Execute action to generate events
    /// 3. Apply events to snapshots via EventApplier
    /// 4. Persist everything atomically
    fn process_command(
        &self,
        cmd: OrderCommand,
    ) -> ManagerResult<(CommandResponse, Vec<OrderEvent>)> {
        tracing::info!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. OpenTable is idempotent per table: reuse the order that still
        // occupies the table instead of opening a duplicate.
        if let shared::order::OrderCommandPayload::OpenTable { table_id, .. } = &cmd.payload
            && let Some(existing) = self.storage.find_open_order_for_table(table_id)?
        {
            tracing::info!(table_id = %table_id, order_id = %existing, "Reusing open order for table");
            return Ok((CommandResponse::success(cmd.command_id, Some(existing)), vec![]));
        }

        // 2. Pre-generate bill number for PrintBill (BEFORE the command
        // transaction - redb does not allow nested write transactions)
        let pre_generated_bill_no = match &cmd.payload {
            shared::order::OrderCommandPayload::PrintBill { .. } => Some(self.next_bill_number()?),
            _ => None,
        };

        // 3. Begin write transaction
        let txn = self.storage.begin_write()?;

        // 4. Create context and metadata
        let current_sequence = self.storage.get_current_sequence()?;
        let mut ctx = CommandContext::new(&txn, &self.storage, current_sequence);
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            operator_id: cmd.operator_id.clone(),
            operator_name: cmd.operator_name.clone(),
            timestamp: cmd.timestamp,
        };

        // 5. Convert to action and execute
        // Commands needing engine-held collaborators are assembled here.
        let action: CommandAction = match &cmd.payload {
            shared::order::OrderCommandPayload::OpenTable { table_id, area_id } => {
                CommandAction::OpenTable(super::actions::OpenTableAction {
                    table_id: table_id.clone(),
                    area_id: area_id.clone(),
                    charge_policy: self.config.charge_policy,
                })
            }
            shared::order::OrderCommandPayload::ApplyItemDelta {
                order_id,
                item_id,
                qty_delta,
                notes,
            } => CommandAction::ApplyItemDelta(super::actions::ApplyItemDeltaAction {
                order_id: order_id.clone(),
                item_id: item_id.clone(),
                qty_delta: *qty_delta,
                notes: notes.clone(),
                catalog: self.catalog.clone(),
                lock_items_after_bill: self.config.lock_items_after_bill,
            }),
            shared::order::OrderCommandPayload::PrintBill { order_id } => {
                let bill_no =
                    pre_generated_bill_no.expect("bill_no must be pre-generated for PrintBill");
                CommandAction::PrintBill(super::actions::PrintBillAction {
                    order_id: order_id.clone(),
                    bill_no,
                })
            }
            _ => (&cmd).into(),
        };
        let events = futures::executor::block_on(action.execute(&mut ctx, &metadata))
            .map_err(ManagerError::from)?;

        // 6. Apply events to snapshots
        for event in &events {
            let mut snapshot = ctx
                .load_snapshot(&event.order_id)
                .unwrap_or_else(|_| OrderSnapshot::new(event.order_id.clone()));

            let applier: EventAction = event.into();
            applier.apply(&mut snapshot, event);

            ctx.save_snapshot(snapshot);
        }

        // 7. Persist events
        for event in &events {
            self.storage.store_event(&txn, event)?;
        }

        // 8. Persist snapshots and update active order tracking
        let mut touched: Vec<(String, OrderStatus)> = Vec::new();
        for snapshot in ctx.modified_snapshots() {
            self.storage.store_snapshot(&txn, snapshot)?;
            touched.push((snapshot.order_id.clone(), snapshot.status));

            match snapshot.status {
                OrderStatus::Closed | OrderStatus::Cancelled => {
                    self.storage.mark_order_inactive(&txn, &snapshot.order_id)?;
                }
                _ => {
                    self.storage.mark_order_active(&txn, &snapshot.order_id)?;
                }
            }
        }

        // 9. Update sequence counter
        let max_sequence = events
            .iter()
            .map(|e| e.sequence)
            .max()
            .unwrap_or(current_sequence);
        if max_sequence > current_sequence {
            self.storage.set_sequence(&txn, max_sequence)?;
        }

        // 10. Commit transaction
        txn.commit().map_err(StorageError::from)?;

        // 11. Ticket baseline maintenance (after commit): a regular KOT
        // resets the running baseline; finished orders must not leak one.
        for event in &events {
            if event.event_type == shared::order::OrderEventType::KotPrinted {
                self.baselines.clear(&event.order_id);
            }
        }
        for (order_id, status) in &touched {
            if matches!(
                status,
                OrderStatus::Paid | OrderStatus::Closed | OrderStatus::Cancelled
            ) {
                self.baselines.clear(order_id);
            }
        }

        // 12. Return response
        let order_id = events.first().map(|e| e.order_id.clone());
        tracing::info!(command_id = %cmd.command_id, order_id = ?order_id, event_count = events.len(), "Command processed successfully");
        Ok((CommandResponse::success(cmd.command_id, order_id), events))
    }

    // ========== Running Kitchen Tickets ==========

    /// Produce a running (delta) kitchen ticket.
    ///
    /// Read-side only: the persisted order is never mutated. The baseline
    /// used for the diff is, in priority order, the stored running baseline,
    /// the most recent regular KOT snapshot, or empty. The full current item
    /// list then becomes the new baseline, so an immediate second running
    /// print yields an empty ticket.
    pub fn print_running_kot(&self, order_id: &str) -> ManagerResult<TicketBody> {
        let snapshot = self
            .storage
            .get_snapshot(order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;

        if snapshot.status.is_terminal() || snapshot.status == OrderStatus::Paid {
            return Err(ManagerError::InvalidState(format!(
                "cannot print running KOT on {:?} order {}",
                snapshot.status, order_id
            )));
        }

        let baseline = match self.baselines.get(order_id) {
            Some(items) => items,
            None => snapshot
                .last_kot_print()
                .map(|print| print.items_snapshot.clone())
                .unwrap_or_default(),
        };

        let lines = tickets::diff_items(&snapshot.items, &baseline);
        self.baselines.set(order_id, snapshot.items.clone());

        Ok(TicketBody {
            order_id: order_id.to_string(),
            table_id: snapshot.table_id.clone(),
            printed_at: chrono::Utc::now().timestamp_millis(),
            lines,
        })
    }

    // ========== Public Query Methods ==========

    /// Get a snapshot by order ID.
    ///
    /// Returned snapshots replace any client-side mirror wholesale.
    pub fn get_snapshot(&self, order_id: &str) -> ManagerResult<Option<OrderSnapshot>> {
        Ok(self.storage.get_snapshot(order_id)?)
    }

    /// Get the order currently occupying a table, if any
    pub fn get_current_order_for_table(
        &self,
        table_id: &str,
    ) -> ManagerResult<Option<OrderSnapshot>> {
        match self.storage.find_open_order_for_table(table_id)? {
            Some(order_id) => Ok(self.storage.get_snapshot(&order_id)?),
            None => Ok(None),
        }
    }

    /// Get all active order snapshots
    pub fn get_active_orders(&self) -> ManagerResult<Vec<OrderSnapshot>> {
        Ok(self.storage.get_active_orders()?)
    }

    /// Get current sequence number
    pub fn get_current_sequence(&self) -> ManagerResult<u64> {
        Ok(self.storage.get_current_sequence()?)
    }

    /// Get events since a given sequence
    pub fn get_events_since(&self, since_sequence: u64) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_events_since(since_sequence)?)
    }

    /// Rebuild a snapshot from events (for verification)
    ///
    /// Uses EventApplier to apply each event to build the snapshot.
    pub fn rebuild_snapshot(&self, order_id: &str) -> ManagerResult<OrderSnapshot> {
        let events = self.storage.get_events_for_order(order_id)?;
        if events.is_empty() {
            return Err(ManagerError::OrderNotFound(order_id.to_string()));
        }

        let mut snapshot = OrderSnapshot::new(order_id.to_string());
        for event in &events {
            let applier: EventAction = event.into();
            applier.apply(&mut snapshot, event);
        }

        Ok(snapshot)
    }
}

// Make OrdersManager Clone-able via Arc'd internals
impl Clone for OrdersManager {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            event_tx: self.event_tx.clone(),
            epoch: self.epoch.clone(),
            config: self.config.clone(),
            catalog: self.catalog.clone(),
            baselines: self.baselines.clone(),
            sink: self.sink.clone(),
        }
    }
}

#[cfg(test)]
mod tests;
