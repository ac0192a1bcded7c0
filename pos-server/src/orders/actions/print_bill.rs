//! PrintBill command handler
//!
//! Appends a bill snapshot with a server-generated bill number and moves the
//! order to `Billed`. Re-billing a `Billed` order appends another print.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// PrintBill action
#[derive(Debug, Clone)]
pub struct PrintBillAction {
    pub order_id: String,
    /// Server-generated bill number (pre-generated by the OrdersManager)
    pub bill_no: String,
}

#[async_trait]
impl CommandHandler for PrintBillAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        match snapshot.status {
            OrderStatus::Open | OrderStatus::KotPrinted | OrderStatus::Billed => {}
            status => {
                return Err(OrderError::InvalidState(format!(
                    "cannot print bill on {:?} order {}",
                    status, self.order_id
                )));
            }
        }

        if snapshot.items.is_empty() {
            return Err(OrderError::InvalidState(format!(
                "order {} has no items to bill",
                self.order_id
            )));
        }

        let seq = ctx.next_sequence();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::BillPrinted,
            EventPayload::BillPrinted {
                bill_no: self.bill_no.clone(),
                totals_snapshot: snapshot.totals.clone(),
            },
        );

        Ok(vec![event])
    }
}
