//! Order snapshot - computed state from event stream
//!
//! The snapshot includes a `state_checksum` field for drift detection.
//! A rebuilt snapshot (event replay) must produce the same checksum as the
//! stored one; a mismatch means the appliers have diverged.

use super::types::{BillPrint, ChargePolicy, KotPrint, OrderItem, OrderTotals, PaymentRecord};
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Freshly opened, accepting items
    #[default]
    Open,
    /// At least one kitchen ticket printed; still accepting items
    KotPrinted,
    /// Bill printed; awaiting payment
    Billed,
    /// Fully settled; awaiting administrative close
    Paid,
    /// Finalized; no further mutation
    Closed,
    /// Cancelled; terminal
    Cancelled,
}

impl OrderStatus {
    /// Terminal states admit no further mutation of any kind.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Closed | OrderStatus::Cancelled)
    }

    /// Whether the order still occupies its table. Settling frees the table
    /// even before the administrative close.
    pub fn occupies_table(&self) -> bool {
        matches!(
            self,
            OrderStatus::Open | OrderStatus::KotPrinted | OrderStatus::Billed
        )
    }

    /// Item-quantity mutation is permitted only before billing.
    pub fn accepts_item_edits(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::KotPrinted)
    }
}

/// Order snapshot - computed from event stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    /// Order ID (assigned by server)
    pub order_id: String,
    /// Table this order belongs to
    pub table_id: String,
    /// Area the table belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,
    /// Order status
    pub status: OrderStatus,
    /// Items in the order, unique by `item_id`
    pub items: Vec<OrderItem>,
    /// Derived totals; recomputed whenever items change
    pub totals: OrderTotals,
    /// Tax/discount rates frozen at open time
    #[serde(default)]
    pub charge_policy: ChargePolicy,
    /// Regular kitchen ticket prints (append-only)
    #[serde(default)]
    pub kot_prints: Vec<KotPrint>,
    /// Bill prints (append-only)
    #[serde(default)]
    pub bill_prints: Vec<BillPrint>,
    /// Payment records (append-only)
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
    /// Running sum of payment amounts
    #[serde(default)]
    pub paid_amount: f64,
    /// Cancellation reason (set once on cancel)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// Operator who opened the order
    pub created_by: String,
    /// Operator name snapshot
    pub created_by_name: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Last update timestamp
    pub updated_at: i64,
    /// Settle/close/cancel timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    /// Last applied event sequence (for incremental updates)
    pub last_sequence: u64,
    /// State checksum for drift detection (hex string)
    #[serde(default)]
    pub state_checksum: String,
}

impl OrderSnapshot {
    /// Create a new empty order
    pub fn new(order_id: String) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        let mut snapshot = Self {
            order_id,
            table_id: String::new(),
            area_id: None,
            status: OrderStatus::Open,
            items: Vec::new(),
            totals: OrderTotals::default(),
            charge_policy: ChargePolicy::default(),
            kot_prints: Vec::new(),
            bill_prints: Vec::new(),
            payments: Vec::new(),
            paid_amount: 0.0,
            cancel_reason: None,
            created_by: String::new(),
            created_by_name: String::new(),
            created_at: now,
            updated_at: now,
            end_time: None,
            last_sequence: 0,
            state_checksum: String::new(),
        };
        snapshot.update_checksum();
        snapshot
    }

    /// Look up an item line by menu item id
    pub fn find_item(&self, item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    /// Total item count across all lines
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|i| i.qty).sum()
    }

    /// Calculate remaining amount to pay
    pub fn outstanding_amount(&self) -> f64 {
        (self.totals.grand_total - self.paid_amount).max(0.0)
    }

    /// The most recent regular kitchen ticket, if any
    pub fn last_kot_print(&self) -> Option<&KotPrint> {
        self.kot_prints.last()
    }

    /// Compute state checksum for drift detection
    ///
    /// Computed from: items.len, grand_total (cents), paid_amount (cents),
    /// last_sequence, status discriminant. Returns a 16-character hex string.
    pub fn compute_checksum(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::Hasher as _;

        let mut hasher = DefaultHasher::new();

        self.items.len().hash(&mut hasher);

        // Money hashed in cents to avoid float precision issues
        ((self.totals.grand_total * 100.0).round() as i64).hash(&mut hasher);
        ((self.paid_amount * 100.0).round() as i64).hash(&mut hasher);

        self.last_sequence.hash(&mut hasher);
        (self.status as u8).hash(&mut hasher);

        format!("{:016x}", hasher.finish())
    }

    /// Update the state_checksum field based on current state
    pub fn update_checksum(&mut self) {
        self.state_checksum = self.compute_checksum();
    }

    /// Verify that the state_checksum matches computed checksum
    pub fn verify_checksum(&self) -> bool {
        self.state_checksum == self.compute_checksum()
    }
}

impl Default for OrderSnapshot {
    fn default() -> Self {
        Self::new(String::new())
    }
}
