//! ApplyItemDelta command handler
//!
//! Adds or removes quantity for one menu item. Name and price are resolved
//! from the menu catalog only when the delta creates the line; existing
//! lines keep their snapshots even if the menu changed since.

use async_trait::async_trait;
use std::sync::Arc;

use crate::orders::money;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::services::menu::MenuCatalog;
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// ApplyItemDelta action
#[derive(Clone)]
pub struct ApplyItemDeltaAction {
    pub order_id: String,
    pub item_id: String,
    pub qty_delta: i32,
    pub notes: Option<String>,
    /// Menu lookup, injected by the OrdersManager
    pub catalog: Arc<dyn MenuCatalog>,
    /// Whether items freeze once the order is billed (engine config)
    pub lock_items_after_bill: bool,
}

#[async_trait]
impl CommandHandler for ApplyItemDeltaAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // Status guards: terminal and settled orders never mutate; billed
        // orders are frozen unless the engine allows post-bill edits.
        match snapshot.status {
            OrderStatus::Open | OrderStatus::KotPrinted => {}
            OrderStatus::Billed => {
                if self.lock_items_after_bill {
                    return Err(OrderError::OrderLocked(self.order_id.clone()));
                }
            }
            OrderStatus::Paid | OrderStatus::Closed | OrderStatus::Cancelled => {
                return Err(OrderError::InvalidState(format!(
                    "cannot edit items on {:?} order {}",
                    snapshot.status, self.order_id
                )));
            }
        }

        money::validate_qty(self.qty_delta.abs())?;

        let existing = snapshot.find_item(&self.item_id);

        // Resolve snapshots only when this delta creates the line
        let (name_snapshot, price_snapshot) = match existing {
            Some(line) => {
                money::validate_qty(line.qty.saturating_add(self.qty_delta))?;
                (None, None)
            }
            None => {
                if self.qty_delta <= 0 {
                    return Err(OrderError::InvalidDelta(format!(
                        "item {} is not on the order (qty_delta {})",
                        self.item_id, self.qty_delta
                    )));
                }
                let meta = self
                    .catalog
                    .resolve(&self.item_id)
                    .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;
                money::validate_price(meta.price)?;
                (Some(meta.name), Some(meta.price))
            }
        };

        let seq = ctx.next_sequence();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::ItemDeltaApplied,
            EventPayload::ItemDeltaApplied {
                item_id: self.item_id.clone(),
                qty_delta: self.qty_delta,
                name_snapshot,
                price_snapshot,
                notes: self.notes.clone(),
            },
        );

        Ok(vec![event])
    }
}
