//! Order commands - requests from billers to modify orders
//!
//! A command either succeeds as a whole (new events, updated snapshot) or
//! fails leaving the stored order untouched. The engine does NOT deduplicate
//! on `command_id`; retry de-duplication is the caller's responsibility.

use super::types::PaymentInput;
use serde::{Deserialize, Serialize};

/// Order command envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    /// Command unique ID (audit tracing)
    pub command_id: String,
    /// Operator issuing the command
    pub operator_id: String,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Command payload
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    pub fn new(operator_id: String, operator_name: String, payload: OrderCommandPayload) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            operator_id,
            operator_name,
            timestamp: chrono::Utc::now().timestamp_millis(),
            payload,
        }
    }
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    /// Open a table's order. Idempotent: if the table already has an order
    /// that occupies it, the existing order is returned instead of a new one.
    OpenTable {
        table_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        area_id: Option<String>,
    },

    /// Add or remove quantity for one menu item
    ApplyItemDelta {
        order_id: String,
        item_id: String,
        qty_delta: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },

    /// Print a regular kitchen ticket (full current item list)
    PrintKot { order_id: String },

    /// Print the bill; freezes the item ledger by default
    PrintBill { order_id: String },

    /// Submit a quick (single) or split (multiple rows) payment batch
    SubmitPayments {
        order_id: String,
        payments: Vec<PaymentInput>,
    },

    /// Cancel the order; terminal
    CancelOrder { order_id: String, reason: String },

    /// Administrative finalize of a settled order
    CloseOrder { order_id: String },
}
