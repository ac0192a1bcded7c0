//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles one specific
//! event type. Appliers are PURE functions of (snapshot, event).

use enum_dispatch::enum_dispatch;

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent};

mod bill_printed;
mod item_delta_applied;
mod kot_printed;
mod order_cancelled;
mod order_closed;
mod payments_added;
mod table_opened;

pub use bill_printed::BillPrintedApplier;
pub use item_delta_applied::ItemDeltaAppliedApplier;
pub use kot_printed::KotPrintedApplier;
pub use order_cancelled::OrderCancelledApplier;
pub use order_closed::OrderClosedApplier;
pub use payments_added::PaymentsAddedApplier;
pub use table_opened::TableOpenedApplier;

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    TableOpened(TableOpenedApplier),
    ItemDeltaApplied(ItemDeltaAppliedApplier),
    KotPrinted(KotPrintedApplier),
    BillPrinted(BillPrintedApplier),
    PaymentsAdded(PaymentsAddedApplier),
    OrderCancelled(OrderCancelledApplier),
    OrderClosed(OrderClosedApplier),
}

/// Convert OrderEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload.
impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::TableOpened { .. } => EventAction::TableOpened(TableOpenedApplier),
            EventPayload::ItemDeltaApplied { .. } => {
                EventAction::ItemDeltaApplied(ItemDeltaAppliedApplier)
            }
            EventPayload::KotPrinted { .. } => EventAction::KotPrinted(KotPrintedApplier),
            EventPayload::BillPrinted { .. } => EventAction::BillPrinted(BillPrintedApplier),
            EventPayload::PaymentsAdded { .. } => EventAction::PaymentsAdded(PaymentsAddedApplier),
            EventPayload::OrderCancelled { .. } => {
                EventAction::OrderCancelled(OrderCancelledApplier)
            }
            EventPayload::OrderClosed { .. } => EventAction::OrderClosed(OrderClosedApplier),
        }
    }
}
