use super::*;
use crate::orders::storage::OrderStorage;
use crate::services::menu::InMemoryMenuCatalog;
use shared::order::{OrderCommandPayload, PaymentInput};

mod test_tickets;

// ========================================================================
// Helpers
// ========================================================================

fn seeded_catalog() -> Arc<InMemoryMenuCatalog> {
    let catalog = InMemoryMenuCatalog::new();
    catalog.add_item("coffee", "Coffee", 4.5);
    catalog.add_item("tea", "Masala Tea", 3.0);
    catalog.add_item("naan", "Butter Naan", 2.5);
    Arc::new(catalog)
}

fn create_test_manager() -> (OrdersManager, Arc<InMemoryMenuCatalog>) {
    let storage = OrderStorage::open_in_memory().unwrap();
    let catalog = seeded_catalog();
    let manager = OrdersManager::with_storage(storage, catalog.clone());
    (manager, catalog)
}

fn cmd(payload: OrderCommandPayload) -> OrderCommand {
    OrderCommand::new("op-1".to_string(), "Test Operator".to_string(), payload)
}

fn open_table(manager: &OrdersManager, table_id: &str) -> String {
    let resp = manager.execute_command(cmd(OrderCommandPayload::OpenTable {
        table_id: table_id.to_string(),
        area_id: Some("area-1".to_string()),
    }));
    assert!(resp.success, "Failed to open table: {:?}", resp.error);
    resp.order_id.unwrap()
}

fn apply_delta(manager: &OrdersManager, order_id: &str, item_id: &str, qty_delta: i32) {
    let resp = manager.execute_command(cmd(OrderCommandPayload::ApplyItemDelta {
        order_id: order_id.to_string(),
        item_id: item_id.to_string(),
        qty_delta,
        notes: None,
    }));
    assert!(resp.success, "Failed to apply delta: {:?}", resp.error);
}

fn print_kot(manager: &OrdersManager, order_id: &str) {
    let resp = manager.execute_command(cmd(OrderCommandPayload::PrintKot {
        order_id: order_id.to_string(),
    }));
    assert!(resp.success, "Failed to print KOT: {:?}", resp.error);
}

fn print_bill(manager: &OrdersManager, order_id: &str) {
    let resp = manager.execute_command(cmd(OrderCommandPayload::PrintBill {
        order_id: order_id.to_string(),
    }));
    assert!(resp.success, "Failed to print bill: {:?}", resp.error);
}

fn pay(method: &str, amount: f64) -> PaymentInput {
    PaymentInput {
        method: method.to_string(),
        amount,
        paid_at: None,
        notes: None,
    }
}

fn settle_in_full(manager: &OrdersManager, order_id: &str) {
    let snapshot = manager.get_snapshot(order_id).unwrap().unwrap();
    let resp = manager.execute_command(cmd(OrderCommandPayload::SubmitPayments {
        order_id: order_id.to_string(),
        payments: vec![pay("cash", snapshot.outstanding_amount())],
    }));
    assert!(resp.success, "Failed to settle: {:?}", resp.error);
}
