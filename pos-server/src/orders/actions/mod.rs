//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{OrderCommand, OrderCommandPayload, OrderEvent};

mod apply_item_delta;
mod cancel_order;
mod close_order;
pub mod open_table;
mod print_bill;
mod print_kot;
mod submit_payments;

pub use apply_item_delta::ApplyItemDeltaAction;
pub use cancel_order::CancelOrderAction;
pub use close_order::CloseOrderAction;
pub use open_table::OpenTableAction;
pub use print_bill::PrintBillAction;
pub use print_kot::PrintKotAction;
pub use submit_payments::SubmitPaymentsAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    OpenTable(OpenTableAction),
    ApplyItemDelta(ApplyItemDeltaAction),
    PrintKot(PrintKotAction),
    PrintBill(PrintBillAction),
    SubmitPayments(SubmitPaymentsAction),
    CancelOrder(CancelOrderAction),
    CloseOrder(CloseOrderAction),
}

#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::OpenTable(action) => action.execute(ctx, metadata).await,
            CommandAction::ApplyItemDelta(action) => action.execute(ctx, metadata).await,
            CommandAction::PrintKot(action) => action.execute(ctx, metadata).await,
            CommandAction::PrintBill(action) => action.execute(ctx, metadata).await,
            CommandAction::SubmitPayments(action) => action.execute(ctx, metadata).await,
            CommandAction::CancelOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::CloseOrder(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Convert OrderCommand to CommandAction
///
/// This is the ONLY place with a match on OrderCommandPayload. Commands that
/// need engine-held collaborators (charge policy, menu catalog, bill counter)
/// are assembled by the OrdersManager instead.
impl From<&OrderCommand> for CommandAction {
    fn from(cmd: &OrderCommand) -> Self {
        match &cmd.payload {
            OrderCommandPayload::OpenTable { .. } => {
                // Carries the engine's charge policy - assembled by OrdersManager
                unreachable!("OpenTable is assembled by OrdersManager")
            }
            OrderCommandPayload::ApplyItemDelta { .. } => {
                // Carries the menu catalog and lock config - assembled by OrdersManager
                unreachable!("ApplyItemDelta is assembled by OrdersManager")
            }
            OrderCommandPayload::PrintBill { .. } => {
                // Carries the pre-generated bill number - assembled by OrdersManager
                unreachable!("PrintBill is assembled by OrdersManager")
            }
            OrderCommandPayload::PrintKot { order_id } => CommandAction::PrintKot(PrintKotAction {
                order_id: order_id.clone(),
            }),
            OrderCommandPayload::SubmitPayments { order_id, payments } => {
                CommandAction::SubmitPayments(SubmitPaymentsAction {
                    order_id: order_id.clone(),
                    payments: payments.clone(),
                })
            }
            OrderCommandPayload::CancelOrder { order_id, reason } => {
                CommandAction::CancelOrder(CancelOrderAction {
                    order_id: order_id.clone(),
                    reason: reason.clone(),
                })
            }
            OrderCommandPayload::CloseOrder { order_id } => {
                CommandAction::CloseOrder(CloseOrderAction {
                    order_id: order_id.clone(),
                })
            }
        }
    }
}
