//! PaymentsAdded event applier
//!
//! Appends the accepted batch, recomputes the paid sum, and settles the
//! order when cumulative payments cover the grand total within tolerance.
//! Settlement is derived from the recorded amounts so replay needs no
//! external state.

use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// PaymentsAdded applier
pub struct PaymentsAddedApplier;

impl EventApplier for PaymentsAddedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::PaymentsAdded { payments } = &event.payload {
            snapshot.payments.extend(payments.iter().cloned());
            snapshot.paid_amount = money::sum_payments(&snapshot.payments);

            if money::is_payment_sufficient(snapshot.paid_amount, snapshot.totals.grand_total) {
                snapshot.status = OrderStatus::Paid;
                snapshot.end_time = Some(event.timestamp);
            }

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}
