//! TableOpened event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// TableOpened applier
pub struct TableOpenedApplier;

impl EventApplier for TableOpenedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::TableOpened {
            table_id,
            area_id,
            charge_policy,
        } = &event.payload
        {
            snapshot.table_id = table_id.clone();
            snapshot.area_id = area_id.clone();
            snapshot.charge_policy = *charge_policy;
            snapshot.status = OrderStatus::Open;
            snapshot.created_by = event.operator_id.clone();
            snapshot.created_by_name = event.operator_name.clone();
            snapshot.created_at = event.timestamp;
            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;
            snapshot.update_checksum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{ChargePolicy, OrderEventType};

    #[test]
    fn test_table_opened_initializes_snapshot() {
        let event = OrderEvent::new(
            1,
            "order-1".to_string(),
            "user-1".to_string(),
            "Test User".to_string(),
            "cmd-1".to_string(),
            Some(1234567890),
            OrderEventType::TableOpened,
            EventPayload::TableOpened {
                table_id: "T1".to_string(),
                area_id: Some("area-1".to_string()),
                charge_policy: ChargePolicy {
                    tax_percent: 5.0,
                    discount_percent: 2.0,
                },
            },
        );

        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        TableOpenedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.table_id, "T1");
        assert_eq!(snapshot.area_id.as_deref(), Some("area-1"));
        assert_eq!(snapshot.status, OrderStatus::Open);
        assert_eq!(snapshot.charge_policy.tax_percent, 5.0);
        assert_eq!(snapshot.created_by, "user-1");
        assert_eq!(snapshot.last_sequence, 1);
        assert!(snapshot.verify_checksum());
    }
}
