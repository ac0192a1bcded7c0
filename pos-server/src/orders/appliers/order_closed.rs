//! OrderClosed event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderClosed applier
pub struct OrderClosedApplier;

impl EventApplier for OrderClosedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderClosed {} = &event.payload {
            snapshot.status = OrderStatus::Closed;
            if snapshot.end_time.is_none() {
                snapshot.end_time = Some(event.timestamp);
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
    use shared::order::OrderEventType;

    #[test]
    fn test_close_finalizes_order() {
        let event = OrderEvent::new(
            9,
            "order-1".to_string(),
            "user-1".to_string(),
            "Test User".to_string(),
            "cmd-1".to_string(),
            None,
            OrderEventType::OrderClosed,
            EventPayload::OrderClosed {},
        );

        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = OrderStatus::Paid;
        snapshot.end_time = Some(100);

        OrderClosedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.status, OrderStatus::Closed);
        // Settle time is preserved
        assert_eq!(snapshot.end_time, Some(100));
        assert_eq!(snapshot.last_sequence, 9);
        assert!(snapshot.verify_checksum());
    }
}
