//! KotPrinted event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, KotPrint, OrderEvent, OrderSnapshot, OrderStatus};

/// KotPrinted applier
pub struct KotPrintedApplier;

impl EventApplier for KotPrintedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::KotPrinted { items_snapshot } = &event.payload {
            snapshot.kot_prints.push(KotPrint {
                printed_at: event.timestamp,
                items_snapshot: items_snapshot.clone(),
            });

            // Status never regresses on re-print
            if snapshot.status == OrderStatus::Open {
                snapshot.status = OrderStatus::KotPrinted;
            }

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{OrderEventType, OrderItem};

    fn kot_event(seq: u64, items: Vec<OrderItem>) -> OrderEvent {
        OrderEvent::new(
            seq,
            "order-1".to_string(),
            "user-1".to_string(),
            "Test User".to_string(),
            "cmd-1".to_string(),
            None,
            OrderEventType::KotPrinted,
            EventPayload::KotPrinted {
                items_snapshot: items,
            },
        )
    }

    fn item(qty: i32) -> OrderItem {
        OrderItem {
            item_id: "item-1".to_string(),
            name_snapshot: "Tandoori Roti".to_string(),
            price_snapshot: 2.0,
            qty,
            notes: None,
        }
    }

    #[test]
    fn test_kot_print_appends_and_advances_status() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = OrderStatus::Open;

        KotPrintedApplier.apply(&mut snapshot, &kot_event(1, vec![item(3)]));

        assert_eq!(snapshot.status, OrderStatus::KotPrinted);
        assert_eq!(snapshot.kot_prints.len(), 1);
        assert_eq!(snapshot.kot_prints[0].items_snapshot[0].qty, 3);
        assert!(snapshot.verify_checksum());
    }

    #[test]
    fn test_reprint_appends_without_status_change() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = OrderStatus::KotPrinted;

        KotPrintedApplier.apply(&mut snapshot, &kot_event(2, vec![item(5)]));

        assert_eq!(snapshot.status, OrderStatus::KotPrinted);
        assert_eq!(snapshot.kot_prints.len(), 1);
        assert_eq!(snapshot.last_sequence, 2);
    }

    #[test]
    fn test_snapshots_are_immutable_copies() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        KotPrintedApplier.apply(&mut snapshot, &kot_event(1, vec![item(2)]));

        // Later ledger changes must not affect the frozen print
        snapshot.items.push(item(9));
        assert_eq!(snapshot.kot_prints[0].items_snapshot[0].qty, 2);
    }
}
