//! End-to-end order lifecycle tests against file-backed storage.
//!
//! The manager-level unit tests run on the in-memory backend; these cover
//! the durable path: state surviving an engine restart, and many orders
//! interleaving against one database file.

use pos_server::services::menu::InMemoryMenuCatalog;
use pos_server::{MenuCatalog, OrdersManager};
use shared::order::{
    OrderCommand, OrderCommandPayload, OrderStatus, PaymentInput,
};
use std::path::Path;
use std::sync::Arc;

fn seeded_catalog() -> Arc<dyn MenuCatalog> {
    let catalog = InMemoryMenuCatalog::new();
    catalog.add_item("coffee", "Coffee", 4.5);
    catalog.add_item("tea", "Masala Tea", 3.0);
    catalog.add_item("naan", "Butter Naan", 2.5);
    Arc::new(catalog)
}

fn open_manager(db_path: &Path) -> OrdersManager {
    OrdersManager::new(db_path, seeded_catalog()).expect("failed to open storage")
}

fn cmd(payload: OrderCommandPayload) -> OrderCommand {
    OrderCommand::new("op-1".to_string(), "Integration Operator".to_string(), payload)
}

fn must_succeed(
    manager: &OrdersManager,
    payload: OrderCommandPayload,
) -> shared::order::CommandResponse {
    let resp = manager.execute_command(cmd(payload));
    assert!(resp.success, "command failed: {:?}", resp.error);
    resp
}

#[test]
fn test_billed_order_survives_engine_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("orders.redb");

    // Session 1: open, add items, ticket, bill
    let order_id = {
        let manager = open_manager(&db_path);
        let order_id = must_succeed(
            &manager,
            OrderCommandPayload::OpenTable {
                table_id: "T12".to_string(),
                area_id: Some("terrace".to_string()),
            },
        )
        .order_id
        .unwrap();

        must_succeed(
            &manager,
            OrderCommandPayload::ApplyItemDelta {
                order_id: order_id.clone(),
                item_id: "coffee".to_string(),
                qty_delta: 2,
                notes: None,
            },
        );
        must_succeed(
            &manager,
            OrderCommandPayload::ApplyItemDelta {
                order_id: order_id.clone(),
                item_id: "naan".to_string(),
                qty_delta: 4,
                notes: Some("extra butter".to_string()),
            },
        );
        must_succeed(
            &manager,
            OrderCommandPayload::PrintKot {
                order_id: order_id.clone(),
            },
        );
        must_succeed(
            &manager,
            OrderCommandPayload::PrintBill {
                order_id: order_id.clone(),
            },
        );
        order_id
    };

    // Session 2: a fresh engine sees the same state
    let manager = open_manager(&db_path);
    let snapshot = manager.get_snapshot(&order_id).unwrap().unwrap();
    assert_eq!(snapshot.status, OrderStatus::Billed);
    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(snapshot.items[1].notes.as_deref(), Some("extra butter"));
    assert_eq!(snapshot.totals.grand_total, 19.0); // 9.0 + 10.0
    assert_eq!(snapshot.kot_prints.len(), 1);
    assert_eq!(snapshot.bill_prints.len(), 1);
    assert!(snapshot.verify_checksum());

    // The table is still occupied across the restart
    let current = manager.get_current_order_for_table("T12").unwrap().unwrap();
    assert_eq!(current.order_id, order_id);

    // Settle and close in the new session
    must_succeed(
        &manager,
        OrderCommandPayload::SubmitPayments {
            order_id: order_id.clone(),
            payments: vec![PaymentInput {
                method: "cash".to_string(),
                amount: 19.0,
                paid_at: None,
                notes: None,
            }],
        },
    );
    must_succeed(
        &manager,
        OrderCommandPayload::CloseOrder {
            order_id: order_id.clone(),
        },
    );

    // Replay from the persisted event stream matches the stored snapshot
    let stored = manager.get_snapshot(&order_id).unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Closed);
    let rebuilt = manager.rebuild_snapshot(&order_id).unwrap();
    assert_eq!(rebuilt.items, stored.items);
    assert_eq!(rebuilt.totals, stored.totals);
    assert_eq!(rebuilt.paid_amount, stored.paid_amount);
    assert_eq!(rebuilt.state_checksum, stored.state_checksum);
}

#[test]
fn test_interleaved_orders_settle_independently() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("orders.redb");
    let manager = open_manager(&db_path);

    const TABLES: usize = 12;

    // Open every table, then interleave the phases across orders the way a
    // busy floor does, rather than running each order to completion alone.
    let order_ids: Vec<String> = (0..TABLES)
        .map(|i| {
            must_succeed(
                &manager,
                OrderCommandPayload::OpenTable {
                    table_id: format!("T{}", i),
                    area_id: None,
                },
            )
            .order_id
            .unwrap()
        })
        .collect();

    for order_id in &order_ids {
        must_succeed(
            &manager,
            OrderCommandPayload::ApplyItemDelta {
                order_id: order_id.clone(),
                item_id: "tea".to_string(),
                qty_delta: 2,
                notes: None,
            },
        );
    }
    for order_id in &order_ids {
        must_succeed(
            &manager,
            OrderCommandPayload::PrintKot {
                order_id: order_id.clone(),
            },
        );
        must_succeed(
            &manager,
            OrderCommandPayload::PrintBill {
                order_id: order_id.clone(),
            },
        );
    }
    for order_id in &order_ids {
        must_succeed(
            &manager,
            OrderCommandPayload::SubmitPayments {
                order_id: order_id.clone(),
                payments: vec![PaymentInput {
                    method: "card".to_string(),
                    amount: 6.0,
                    paid_at: None,
                    notes: None,
                }],
            },
        );
        must_succeed(
            &manager,
            OrderCommandPayload::CloseOrder {
                order_id: order_id.clone(),
            },
        );
    }

    assert!(manager.get_active_orders().unwrap().is_empty());

    // Open + delta + kot + bill + payments + close per order
    let events = manager.get_events_since(0).unwrap();
    assert_eq!(events.len(), TABLES * 6);

    // Sequences are globally unique and dense
    let mut sequences: Vec<u64> = events.iter().map(|e| e.sequence).collect();
    sequences.sort_unstable();
    sequences.dedup();
    assert_eq!(sequences.len(), TABLES * 6);
    assert_eq!(manager.get_current_sequence().unwrap(), (TABLES * 6) as u64);

    // Every closed order replays to its stored state
    for order_id in &order_ids {
        let stored = manager.get_snapshot(order_id).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Closed);
        let rebuilt = manager.rebuild_snapshot(order_id).unwrap();
        assert_eq!(rebuilt.state_checksum, stored.state_checksum);
    }
}
