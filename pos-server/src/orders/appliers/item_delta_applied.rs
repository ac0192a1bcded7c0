//! ItemDeltaApplied event applier
//!
//! Merges a quantity delta into the item ledger. A line that reaches zero
//! quantity disappears from the ledger (and therefore from totals and
//! ticket diffs). Totals are recomputed afterwards.

use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderItem, OrderSnapshot};

/// ItemDeltaApplied applier
pub struct ItemDeltaAppliedApplier;

impl EventApplier for ItemDeltaAppliedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemDeltaApplied {
            item_id,
            qty_delta,
            name_snapshot,
            price_snapshot,
            notes,
        } = &event.payload
        {
            if let Some(pos) = snapshot.items.iter().position(|i| &i.item_id == item_id) {
                let new_qty = snapshot.items[pos].qty + qty_delta;
                if new_qty <= 0 {
                    snapshot.items.remove(pos);
                } else {
                    let line = &mut snapshot.items[pos];
                    line.qty = new_qty;
                    if notes.is_some() {
                        line.notes = notes.clone();
                    }
                }
            } else if *qty_delta > 0
                && let (Some(name), Some(price)) = (name_snapshot, price_snapshot)
            {
                snapshot.items.push(OrderItem {
                    item_id: item_id.clone(),
                    name_snapshot: name.clone(),
                    price_snapshot: *price,
                    qty: *qty_delta,
                    notes: notes.clone(),
                });
            }

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            money::recalculate_totals(snapshot);
            snapshot.update_checksum();
        }
    }
}
