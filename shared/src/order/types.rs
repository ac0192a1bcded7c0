//! Shared types for order event sourcing

use serde::{Deserialize, Serialize};

// ============================================================================
// Order Item Types
// ============================================================================

/// Order line item.
///
/// `name_snapshot` and `price_snapshot` are captured from the menu at the
/// moment the item is first added and never refreshed afterwards, even if
/// the master menu changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Menu item ID (unique per order; repeated adds merge by quantity)
    pub item_id: String,
    /// Item name frozen at first add
    pub name_snapshot: String,
    /// Unit price frozen at first add
    pub price_snapshot: f64,
    /// Quantity (always > 0; a line reaching 0 is removed from the ledger)
    pub qty: i32,
    /// Line note for the kitchen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ============================================================================
// Totals and Charge Policy
// ============================================================================

/// Derived order totals.
///
/// Never mutated directly; recomputed from the item list whenever items
/// change. Invariant: `grand_total == max(0, sub_total + tax_total - discount_total)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderTotals {
    pub sub_total: f64,
    pub tax_total: f64,
    pub discount_total: f64,
    pub grand_total: f64,
}

/// Tax/discount rates applied by the totals engine.
///
/// The policy itself is configured on the engine; it is frozen into the
/// order at open time so event replay stays deterministic even if the
/// configured rates change later.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ChargePolicy {
    /// Tax rate in percent of the subtotal (e.g. 5.0 for 5%)
    #[serde(default)]
    pub tax_percent: f64,
    /// Discount rate in percent of the subtotal
    #[serde(default)]
    pub discount_percent: f64,
}

// ============================================================================
// Print Records
// ============================================================================

/// A regular kitchen ticket print, frozen at print time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KotPrint {
    /// Print timestamp (Unix milliseconds)
    pub printed_at: i64,
    /// Full item list at print time (full quantities, not deltas)
    pub items_snapshot: Vec<OrderItem>,
}

/// A bill print, frozen at print time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillPrint {
    /// Print timestamp (Unix milliseconds)
    pub printed_at: i64,
    /// Server-generated bill number
    pub bill_no: String,
    /// Totals at print time
    pub totals_snapshot: OrderTotals,
}

// ============================================================================
// Payment Types
// ============================================================================

/// Payment input - one row of a quick or split submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Free-form method tag (e.g. cash/upi/card)
    pub method: String,
    pub amount: f64,
    /// Payment timestamp; stamped by the server when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payment record in snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub method: String,
    pub amount: f64,
    /// Payment timestamp (Unix milliseconds)
    pub paid_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ============================================================================
// Kitchen Ticket Body
// ============================================================================

/// One printable ticket line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketLine {
    pub item_id: String,
    pub name: String,
    pub qty: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of a running (delta) kitchen ticket.
///
/// Produced by the read side; printing a running ticket never mutates the
/// persisted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketBody {
    pub order_id: String,
    pub table_id: String,
    /// Ticket timestamp (Unix milliseconds)
    pub printed_at: i64,
    /// Only the items the kitchen has not yet seen; empty when nothing new
    pub lines: Vec<TicketLine>,
}

impl TicketBody {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// ============================================================================
// Command Response
// ============================================================================

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Order the command acted on (set on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, order_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            error: Some(error),
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    OrderNotFound,
    InvalidDelta,
    ItemNotFound,
    OrderLocked,
    InvalidState,
    AmountMismatch,
    NothingToPay,
    InternalError,
    // Storage errors
    StorageFull,
    OutOfMemory,
    StorageCorrupted,
    SystemBusy,
}
