//! OpenTable command handler
//!
//! Creates a new order for a table. The idempotent-reuse path (returning an
//! existing order that still occupies the table) is resolved by the
//! OrdersManager before this action runs; reaching this action with an
//! occupied table is a state error.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{ChargePolicy, EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// OpenTable action
#[derive(Debug, Clone)]
pub struct OpenTableAction {
    pub table_id: String,
    pub area_id: Option<String>,
    /// Engine charge policy, frozen into the order for its lifetime
    pub charge_policy: ChargePolicy,
}

#[async_trait]
impl CommandHandler for OpenTableAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.table_id.trim().is_empty() {
            return Err(OrderError::InvalidState(
                "table_id must not be empty".to_string(),
            ));
        }

        // Manager resolves reuse before the transaction; double-check here so
        // the action stays safe when driven directly.
        if let Some(existing) = ctx.find_open_order_for_table(&self.table_id)? {
            return Err(OrderError::InvalidState(format!(
                "table {} already has open order {}",
                self.table_id, existing
            )));
        }

        let order_id = Uuid::new_v4().to_string();
        let seq = ctx.next_sequence();

        let mut snapshot = ctx.create_snapshot(order_id.clone());
        snapshot.table_id = self.table_id.clone();
        snapshot.area_id = self.area_id.clone();
        snapshot.charge_policy = self.charge_policy;
        snapshot.status = OrderStatus::Open;
        snapshot.created_by = metadata.operator_id.clone();
        snapshot.created_by_name = metadata.operator_name.clone();
        snapshot.created_at = metadata.timestamp;
        snapshot.updated_at = metadata.timestamp;
        snapshot.last_sequence = seq;
        snapshot.update_checksum();
        ctx.save_snapshot(snapshot);

        let event = OrderEvent::new(
            seq,
            order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::TableOpened,
            EventPayload::TableOpened {
                table_id: self.table_id.clone(),
                area_id: self.area_id.clone(),
                charge_policy: self.charge_policy,
            },
        );

        info!(order_id = %order_id, table_id = %self.table_id, "table opened");
        Ok(vec![event])
    }
}
