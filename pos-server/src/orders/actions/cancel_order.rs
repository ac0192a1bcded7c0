//! CancelOrder command handler
//!
//! Cancellation is terminal. A non-empty reason is required for the audit
//! trail; closed orders can no longer be cancelled.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// CancelOrder action
#[derive(Debug, Clone)]
pub struct CancelOrderAction {
    pub order_id: String,
    pub reason: String,
}

#[async_trait]
impl CommandHandler for CancelOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.reason.trim().is_empty() {
            return Err(OrderError::InvalidState(
                "cancellation reason is required".to_string(),
            ));
        }

        let snapshot = ctx.load_snapshot(&self.order_id)?;

        match snapshot.status {
            OrderStatus::Cancelled => {
                return Err(OrderError::InvalidState(format!(
                    "order {} is already cancelled",
                    self.order_id
                )));
            }
            OrderStatus::Closed => {
                return Err(OrderError::InvalidState(format!(
                    "order {} is closed and cannot be cancelled",
                    self.order_id
                )));
            }
            _ => {}
        }

        let seq = ctx.next_sequence();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::OrderCancelled,
            EventPayload::OrderCancelled {
                reason: self.reason.clone(),
            },
        );

        Ok(vec![event])
    }
}
