//! Kitchen ticket differ and baseline store
//!
//! A running (delta) ticket shows only what the kitchen has not yet seen:
//! the current item list diffed against a baseline. The baseline priority
//! chain is: last running-ticket baseline, else the most recent regular KOT
//! snapshot, else empty (everything counts as new).
//!
//! The baseline store is local to the engine instance and is not shared
//! across instances operating on the same order.

use dashmap::DashMap;
use shared::order::{OrderItem, TicketLine};
use std::collections::HashMap;

/// Baseline storage keyed by order id.
///
/// Contract: `set` overwrites on every running print; `clear` runs when a
/// regular KOT is printed and when the order settles or terminates, so stale
/// baselines never leak into later orders reusing the storage.
pub trait TicketBaselineStore: Send + Sync {
    fn get(&self, order_id: &str) -> Option<Vec<OrderItem>>;
    fn set(&self, order_id: &str, items: Vec<OrderItem>);
    fn clear(&self, order_id: &str);
}

/// In-memory baseline store
#[derive(Debug, Default)]
pub struct InMemoryBaselineStore {
    baselines: DashMap<String, Vec<OrderItem>>,
}

impl InMemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TicketBaselineStore for InMemoryBaselineStore {
    fn get(&self, order_id: &str) -> Option<Vec<OrderItem>> {
        self.baselines.get(order_id).map(|items| items.clone())
    }

    fn set(&self, order_id: &str, items: Vec<OrderItem>) {
        self.baselines.insert(order_id.to_string(), items);
    }

    fn clear(&self, order_id: &str) {
        self.baselines.remove(order_id);
    }
}

/// Compute the items newly added since the baseline.
///
/// Baseline quantities are summed into a map keyed by `item_id` (duplicates
/// tolerated); each current line with `qty` above its baseline quantity is
/// emitted with only the difference. Lines at or below baseline are omitted.
pub fn diff_items(current: &[OrderItem], baseline: &[OrderItem]) -> Vec<TicketLine> {
    let mut baseline_qty: HashMap<&str, i32> = HashMap::new();
    for item in baseline {
        *baseline_qty.entry(item.item_id.as_str()).or_insert(0) += item.qty;
    }

    let mut lines = Vec::new();
    for item in current {
        let seen = baseline_qty.get(item.item_id.as_str()).copied().unwrap_or(0);
        if item.qty > seen {
            lines.push(TicketLine {
                item_id: item.item_id.clone(),
                name: item.name_snapshot.clone(),
                qty: item.qty - seen,
                notes: item.notes.clone(),
            });
        }
    }

    lines
}
