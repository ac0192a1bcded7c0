//! BillPrinted event applier

use crate::orders::traits::EventApplier;
use shared::order::{BillPrint, EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// BillPrinted applier
pub struct BillPrintedApplier;

impl EventApplier for BillPrintedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::BillPrinted {
            bill_no,
            totals_snapshot,
        } = &event.payload
        {
            snapshot.bill_prints.push(BillPrint {
                printed_at: event.timestamp,
                bill_no: bill_no.clone(),
                totals_snapshot: totals_snapshot.clone(),
            });
            snapshot.status = OrderStatus::Billed;

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}
