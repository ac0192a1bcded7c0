//! Order events - immutable facts recorded after command processing

use super::types::{ChargePolicy, OrderItem, OrderTotals, PaymentRecord};
use serde::{Deserialize, Serialize};

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number (for ordering and replay)
    /// This is the AUTHORITATIVE ordering mechanism for state evolution
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds) - AUTHORITATIVE for state evolution
    pub timestamp: i64,
    /// Client timestamp (Unix milliseconds) - for audit and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    /// Operator who triggered this event
    pub operator_id: String,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Command that triggered this event (for audit tracing)
    pub command_id: String,
    /// Event type
    pub event_type: OrderEventType,
    /// Event payload
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    // Lifecycle
    TableOpened,
    OrderCancelled,
    OrderClosed,

    // Items
    ItemDeltaApplied,

    // Printing
    KotPrinted,
    BillPrinted,

    // Payments
    PaymentsAdded,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEventType::TableOpened => write!(f, "TABLE_OPENED"),
            OrderEventType::OrderCancelled => write!(f, "ORDER_CANCELLED"),
            OrderEventType::OrderClosed => write!(f, "ORDER_CLOSED"),
            OrderEventType::ItemDeltaApplied => write!(f, "ITEM_DELTA_APPLIED"),
            OrderEventType::KotPrinted => write!(f, "KOT_PRINTED"),
            OrderEventType::BillPrinted => write!(f, "BILL_PRINTED"),
            OrderEventType::PaymentsAdded => write!(f, "PAYMENTS_ADDED"),
        }
    }
}

/// Event payload variants
///
/// Payloads carry everything the applier needs so that replay uses event
/// data alone, never external state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Lifecycle ==========
    TableOpened {
        table_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        area_id: Option<String>,
        /// Tax/discount rates frozen for this order's lifetime
        charge_policy: ChargePolicy,
    },

    OrderCancelled {
        reason: String,
    },

    OrderClosed {},

    // ========== Items ==========
    ItemDeltaApplied {
        item_id: String,
        qty_delta: i32,
        /// Present only when this delta created the line (first add)
        #[serde(skip_serializing_if = "Option::is_none")]
        name_snapshot: Option<String>,
        /// Present only when this delta created the line (first add)
        #[serde(skip_serializing_if = "Option::is_none")]
        price_snapshot: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },

    // ========== Printing ==========
    KotPrinted {
        /// Full item list at print time (full quantities, not deltas)
        items_snapshot: Vec<OrderItem>,
    },

    BillPrinted {
        bill_no: String,
        totals_snapshot: OrderTotals,
    },

    // ========== Payments ==========
    PaymentsAdded {
        /// Complete records for the accepted batch (all-or-nothing)
        payments: Vec<PaymentRecord>,
    },
}

impl OrderEvent {
    /// Create a new event
    ///
    /// The server timestamp is always set here; the client timestamp is
    /// preserved from the originating command for audit.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        order_id: String,
        operator_id: String,
        operator_name: String,
        command_id: String,
        client_timestamp: Option<i64>,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id,
            timestamp: chrono::Utc::now().timestamp_millis(),
            client_timestamp,
            operator_id,
            operator_name,
            command_id,
            event_type,
            payload,
        }
    }

    /// Create event from command (extracts metadata including client timestamp)
    pub fn from_command(
        sequence: u64,
        order_id: String,
        command: &super::OrderCommand,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self::new(
            sequence,
            order_id,
            command.operator_id.clone(),
            command.operator_name.clone(),
            command.command_id.clone(),
            Some(command.timestamp),
            event_type,
            payload,
        )
    }
}
