//! PrintKot command handler
//!
//! Appends a full-item kitchen ticket snapshot. Re-printing from
//! `KotPrinted` is allowed and appends another snapshot; billed and
//! finished orders cannot produce kitchen tickets.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// PrintKot action
#[derive(Debug, Clone)]
pub struct PrintKotAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for PrintKotAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        match snapshot.status {
            OrderStatus::Open | OrderStatus::KotPrinted => {}
            status => {
                return Err(OrderError::InvalidState(format!(
                    "cannot print KOT on {:?} order {}",
                    status, self.order_id
                )));
            }
        }

        if snapshot.items.is_empty() {
            return Err(OrderError::InvalidState(format!(
                "order {} has no items to print",
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
            OrderEventType::KotPrinted,
            EventPayload::KotPrinted {
                items_snapshot: snapshot.items.clone(),
            },
        );

        Ok(vec![event])
    }
}
