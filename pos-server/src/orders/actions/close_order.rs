//! CloseOrder command handler
//!
//! Administrative finalize. Only a fully-settled order can close: either
//! already `Paid`, or `Billed` with a fully covered balance.

use async_trait::async_trait;

use crate::orders::money;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// CloseOrder action
#[derive(Debug, Clone)]
pub struct CloseOrderAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for CloseOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        let settled = match snapshot.status {
            OrderStatus::Paid => true,
            OrderStatus::Billed => {
                money::is_payment_sufficient(snapshot.paid_amount, snapshot.totals.grand_total)
            }
            _ => false,
        };

        if !settled {
            return Err(OrderError::InvalidState(format!(
                "order {} is not settled ({:?}, outstanding {:.2})",
                self.order_id,
                snapshot.status,
                snapshot.outstanding_amount()
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
            OrderEventType::OrderClosed,
            EventPayload::OrderClosed {},
        );

        Ok(vec![event])
    }
}
