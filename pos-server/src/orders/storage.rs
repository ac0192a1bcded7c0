//! redb-based storage layer for order event sourcing
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `events` | `(order_id, sequence)` | `OrderEvent` | Event stream (append-only) |
//! | `snapshots` | `order_id` | `OrderSnapshot` | Snapshot cache |
//! | `active_orders` | `order_id` | `()` | Active order index |
//! | `sequence_counter` | `()` | `u64` | Global sequence and bill counter |
//!
//! # Durability
//!
//! redb commits with immediate durability by default: copy-on-write with an
//! atomic pointer swap, so the database file stays consistent across power
//! loss. POS terminals get shut down uncleanly all the time.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::order::{OrderEvent, OrderSnapshot};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for storing events: key = (order_id, sequence), value = JSON-serialized OrderEvent
const EVENTS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("events");

/// Table for storing snapshots: key = order_id, value = JSON-serialized OrderSnapshot
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

/// Table for tracking active orders: key = order_id, value = empty (existence check)
const ACTIVE_ORDERS_TABLE: TableDefinition<&str, ()> = TableDefinition::new("active_orders");

/// Table for counters: key = "seq" or "bill_count", value = u64
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const SEQUENCE_KEY: &str = "seq";
const BILL_COUNT_KEY: &str = "bill_count";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(EVENTS_TABLE)?;
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_ORDERS_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(SEQUENCE_KEY)?.is_none() {
                seq_table.insert(SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Sequence Operations ==========

    /// Get current sequence (read-only)
    pub fn get_current_sequence(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    /// Set sequence number (within transaction)
    ///
    /// Used by the action-based architecture to update sequence after events
    /// are generated.
    pub fn set_sequence(&self, txn: &WriteTransaction, sequence: u64) -> StorageResult<()> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        table.insert(SEQUENCE_KEY, sequence)?;
        Ok(())
    }

    // ========== Bill Counter ==========

    /// Get and increment the bill counter atomically (crash-safe).
    /// Returns the NEW count after increment.
    ///
    /// Runs in its own write transaction; call before opening the command
    /// transaction (redb does not allow nested write transactions).
    pub fn next_bill_count(&self) -> StorageResult<u64> {
        let txn = self.db.begin_write()?;
        let next = {
            let mut table = txn.open_table(SEQUENCE_TABLE)?;
            let current = table.get(BILL_COUNT_KEY)?.map(|g| g.value()).unwrap_or(0);
            let next = current + 1;
            table.insert(BILL_COUNT_KEY, next)?;
            next
        };
        txn.commit()?;
        Ok(next)
    }

    // ========== Event Operations ==========

    /// Store an event
    pub fn store_event(&self, txn: &WriteTransaction, event: &OrderEvent) -> StorageResult<()> {
        let mut table = txn.open_table(EVENTS_TABLE)?;
        let key = (event.order_id.as_str(), event.sequence);
        let value = serde_json::to_vec(event)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// Get all events for an order, ordered by sequence.
    ///
    /// The `(order_id, sequence)` key makes range iteration return events in
    /// sequence order already; no re-sort needed.
    pub fn get_events_for_order(&self, order_id: &str) -> StorageResult<Vec<OrderEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        for result in table.range((order_id, 0u64)..=(order_id, u64::MAX))? {
            let (_key, value) = result?;
            events.push(serde_json::from_slice(value.value())?);
        }

        Ok(events)
    }

    /// Get events since a given sequence (across all orders)
    pub fn get_events_since(&self, since_sequence: u64) -> StorageResult<Vec<OrderEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let event: OrderEvent = serde_json::from_slice(value.value())?;
            if event.sequence > since_sequence {
                events.push(event);
            }
        }

        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    // ========== Snapshot Operations ==========

    /// Store a snapshot
    pub fn store_snapshot(
        &self,
        txn: &WriteTransaction,
        snapshot: &OrderSnapshot,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SNAPSHOTS_TABLE)?;
        let value = serde_json::to_vec(snapshot)?;
        table.insert(snapshot.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a snapshot by order ID
    pub fn get_snapshot(&self, order_id: &str) -> StorageResult<Option<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        Ok(table
            .get(order_id)?
            .map(|value| serde_json::from_slice(value.value()))
            .transpose()?)
    }

    /// Get a snapshot by order ID (within transaction)
    pub fn get_snapshot_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<OrderSnapshot>> {
        let table = txn.open_table(SNAPSHOTS_TABLE)?;

        Ok(table
            .get(order_id)?
            .map(|value| serde_json::from_slice(value.value()))
            .transpose()?)
    }

    // ========== Active Orders ==========

    /// Mark an order as active
    pub fn mark_order_active(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.insert(order_id, ())?;
        Ok(())
    }

    /// Mark an order as inactive
    pub fn mark_order_inactive(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    /// Get all active order IDs
    pub fn get_active_order_ids(&self) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;

        table
            .iter()?
            .map(|entry| Ok(entry?.0.value().to_string()))
            .collect()
    }

    /// Get all active order snapshots
    pub fn get_active_orders(&self) -> StorageResult<Vec<OrderSnapshot>> {
        let active_ids = self.get_active_order_ids()?;
        let mut snapshots = Vec::new();

        for order_id in active_ids {
            if let Some(snapshot) = self.get_snapshot(&order_id)? {
                snapshots.push(snapshot);
            }
        }

        Ok(snapshots)
    }

    /// Find the order occupying a table (within transaction)
    ///
    /// Settled and terminal orders do not occupy their table.
    pub fn find_open_order_for_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: &str,
    ) -> StorageResult<Option<String>> {
        let active_table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let snapshots_table = txn.open_table(SNAPSHOTS_TABLE)?;

        for result in active_table.iter()? {
            let (key, _) = result?;
            let order_id = key.value();

            if let Some(value) = snapshots_table.get(order_id)? {
                let snapshot: OrderSnapshot = serde_json::from_slice(value.value())?;
                if snapshot.table_id == table_id && snapshot.status.occupies_table() {
                    return Ok(Some(order_id.to_string()));
                }
            }
        }

        Ok(None)
    }

    /// Find the order occupying a table (read-only, outside transaction)
    pub fn find_open_order_for_table(&self, table_id: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let active_table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let snapshots_table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        for result in active_table.iter()? {
            let (key, _) = result?;
            let order_id = key.value();

            if let Some(value) = snapshots_table.get(order_id)? {
                let snapshot: OrderSnapshot = serde_json::from_slice(value.value())?;
                if snapshot.table_id == table_id && snapshot.status.occupies_table() {
                    return Ok(Some(order_id.to_string()));
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{EventPayload, OrderEventType, OrderStatus};

    fn test_event(order_id: &str, seq: u64) -> OrderEvent {
        OrderEvent::new(
            seq,
            order_id.to_string(),
            "user-1".to_string(),
            "Test User".to_string(),
            "cmd-1".to_string(),
            None,
            OrderEventType::OrderClosed,
            EventPayload::OrderClosed {},
        )
    }

    #[test]
    fn test_sequence_starts_at_zero() {
        let storage = OrderStorage::open_in_memory().unwrap();
        assert_eq!(storage.get_current_sequence().unwrap(), 0);
    }

    #[test]
    fn test_set_sequence_persists_after_commit() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.set_sequence(&txn, 7).unwrap();
        txn.commit().unwrap();
        assert_eq!(storage.get_current_sequence().unwrap(), 7);
    }

    #[test]
    fn test_events_roundtrip_ordered() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.store_event(&txn, &test_event("order-1", 2)).unwrap();
        storage.store_event(&txn, &test_event("order-1", 1)).unwrap();
        storage.store_event(&txn, &test_event("order-2", 3)).unwrap();
        txn.commit().unwrap();

        let events = storage.get_events_for_order("order-1").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 2);

        let since = storage.get_events_since(1).unwrap();
        assert_eq!(since.len(), 2);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.table_id = "T1".to_string();

        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, &snapshot).unwrap();
        txn.commit().unwrap();

        let loaded = storage.get_snapshot("order-1").unwrap().unwrap();
        assert_eq!(loaded.table_id, "T1");
        assert!(storage.get_snapshot("missing").unwrap().is_none());
    }

    #[test]
    fn test_bill_counter_increments() {
        let storage = OrderStorage::open_in_memory().unwrap();
        assert_eq!(storage.next_bill_count().unwrap(), 1);
        assert_eq!(storage.next_bill_count().unwrap(), 2);
    }

    #[test]
    fn test_find_open_order_for_table_skips_settled() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let mut open = OrderSnapshot::new("order-open".to_string());
        open.table_id = "T1".to_string();
        open.status = OrderStatus::Billed;

        let mut paid = OrderSnapshot::new("order-paid".to_string());
        paid.table_id = "T2".to_string();
        paid.status = OrderStatus::Paid;

        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, &open).unwrap();
        storage.store_snapshot(&txn, &paid).unwrap();
        storage.mark_order_active(&txn, "order-open").unwrap();
        storage.mark_order_active(&txn, "order-paid").unwrap();
        txn.commit().unwrap();

        assert_eq!(
            storage.find_open_order_for_table("T1").unwrap(),
            Some("order-open".to_string())
        );
        // Paid order no longer occupies its table
        assert_eq!(storage.find_open_order_for_table("T2").unwrap(), None);
    }

    #[test]
    fn test_active_order_index() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let snapshot = OrderSnapshot::new("order-1".to_string());

        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, &snapshot).unwrap();
        storage.mark_order_active(&txn, "order-1").unwrap();
        txn.commit().unwrap();

        assert_eq!(storage.get_active_orders().unwrap().len(), 1);

        let txn = storage.begin_write().unwrap();
        storage.mark_order_inactive(&txn, "order-1").unwrap();
        txn.commit().unwrap();

        assert!(storage.get_active_orders().unwrap().is_empty());
    }
}
