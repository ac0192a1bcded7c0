use super::*;

// ========================================================================
// Running (delta) tickets
// ========================================================================

#[test]
fn test_running_kot_emits_delta_against_baseline() {
    let (manager, _) = create_test_manager();
    let order_id = open_table(&manager, "T1");
    apply_delta(&manager, &order_id, "coffee", 2);

    // No baseline yet: everything counts as new
    let ticket = manager.print_running_kot(&order_id).unwrap();
    assert_eq!(ticket.order_id, order_id);
    assert_eq!(ticket.table_id, "T1");
    assert_eq!(ticket.lines.len(), 1);
    assert_eq!(ticket.lines[0].item_id, "coffee");
    assert_eq!(ticket.lines[0].qty, 2);

    // Baseline [coffee:2], current [coffee:5, tea:1] -> [coffee:3, tea:1]
    apply_delta(&manager, &order_id, "coffee", 3);
    apply_delta(&manager, &order_id, "tea", 1);

    let ticket = manager.print_running_kot(&order_id).unwrap();
    assert_eq!(ticket.lines.len(), 2);
    assert_eq!(ticket.lines[0].item_id, "coffee");
    assert_eq!(ticket.lines[0].qty, 3);
    assert_eq!(ticket.lines[1].item_id, "tea");
    assert_eq!(ticket.lines[1].qty, 1);

    // No new adds: second running print is empty
    let ticket = manager.print_running_kot(&order_id).unwrap();
    assert!(ticket.is_empty());
}

#[test]
fn test_regular_kot_resets_baseline() {
    let (manager, _) = create_test_manager();
    let order_id = open_table(&manager, "T1");
    apply_delta(&manager, &order_id, "coffee", 2);

    let ticket = manager.print_running_kot(&order_id).unwrap();
    assert_eq!(ticket.lines.len(), 1);

    apply_delta(&manager, &order_id, "coffee", 1);
    print_kot(&manager, &order_id);

    // The regular print covered everything: running right after is empty
    let ticket = manager.print_running_kot(&order_id).unwrap();
    assert!(ticket.is_empty());

    // Only additions after the regular print show up
    apply_delta(&manager, &order_id, "tea", 1);
    let ticket = manager.print_running_kot(&order_id).unwrap();
    assert_eq!(ticket.lines.len(), 1);
    assert_eq!(ticket.lines[0].item_id, "tea");
    assert_eq!(ticket.lines[0].qty, 1);
}

#[test]
fn test_baseline_falls_back_to_last_kot_print() {
    let (manager, _) = create_test_manager();
    let order_id = open_table(&manager, "T1");
    apply_delta(&manager, &order_id, "coffee", 2);
    print_kot(&manager, &order_id);

    // No running baseline stored; the KOT snapshot is the baseline
    apply_delta(&manager, &order_id, "naan", 2);
    let ticket = manager.print_running_kot(&order_id).unwrap();
    assert_eq!(ticket.lines.len(), 1);
    assert_eq!(ticket.lines[0].item_id, "naan");
    assert_eq!(ticket.lines[0].qty, 2);
}

#[test]
fn test_running_kot_on_empty_order_is_empty_body() {
    let (manager, _) = create_test_manager();
    let order_id = open_table(&manager, "T1");

    // Empty ticket body, not an error
    let ticket = manager.print_running_kot(&order_id).unwrap();
    assert!(ticket.is_empty());
}

#[test]
fn test_running_kot_does_not_mutate_order() {
    let (manager, _) = create_test_manager();
    let order_id = open_table(&manager, "T1");
    apply_delta(&manager, &order_id, "coffee", 2);

    let before = manager.get_snapshot(&order_id).unwrap().unwrap();
    manager.print_running_kot(&order_id).unwrap();
    let after = manager.get_snapshot(&order_id).unwrap().unwrap();

    assert_eq!(after.status, OrderStatus::Open);
    assert!(after.kot_prints.is_empty());
    assert_eq!(after.last_sequence, before.last_sequence);
    assert_eq!(after.state_checksum, before.state_checksum);
}

#[test]
fn test_decreased_quantities_do_not_emit() {
    let (manager, _) = create_test_manager();
    let order_id = open_table(&manager, "T1");
    apply_delta(&manager, &order_id, "coffee", 3);
    manager.print_running_kot(&order_id).unwrap();

    apply_delta(&manager, &order_id, "coffee", -1);
    apply_delta(&manager, &order_id, "tea", 1);

    // coffee went 3 -> 2: omitted entirely, never negative
    let ticket = manager.print_running_kot(&order_id).unwrap();
    assert_eq!(ticket.lines.len(), 1);
    assert_eq!(ticket.lines[0].item_id, "tea");
}

// ========================================================================
// Baseline lifecycle
// ========================================================================

#[test]
fn test_settlement_clears_baseline() {
    let (mut manager, _) = create_test_manager();
    let store = Arc::new(InMemoryBaselineStore::new());
    manager.set_baseline_store(store.clone());

    let order_id = open_table(&manager, "T1");
    apply_delta(&manager, &order_id, "coffee", 2);
    manager.print_running_kot(&order_id).unwrap();
    assert!(store.get(&order_id).is_some());

    print_bill(&manager, &order_id);
    settle_in_full(&manager, &order_id);

    // A finished order must not leak its baseline
    assert!(store.get(&order_id).is_none());
}

#[test]
fn test_cancellation_clears_baseline() {
    let (mut manager, _) = create_test_manager();
    let store = Arc::new(InMemoryBaselineStore::new());
    manager.set_baseline_store(store.clone());

    let order_id = open_table(&manager, "T1");
    apply_delta(&manager, &order_id, "coffee", 2);
    manager.print_running_kot(&order_id).unwrap();
    assert!(store.get(&order_id).is_some());

    let resp = manager.execute_command(cmd(OrderCommandPayload::CancelOrder {
        order_id: order_id.clone(),
        reason: "customer left".to_string(),
    }));
    assert!(resp.success);
    assert!(store.get(&order_id).is_none());
}

#[test]
fn test_regular_kot_clears_stored_baseline() {
    let (mut manager, _) = create_test_manager();
    let store = Arc::new(InMemoryBaselineStore::new());
    manager.set_baseline_store(store.clone());

    let order_id = open_table(&manager, "T1");
    apply_delta(&manager, &order_id, "coffee", 2);
    manager.print_running_kot(&order_id).unwrap();
    assert!(store.get(&order_id).is_some());

    print_kot(&manager, &order_id);
    assert!(store.get(&order_id).is_none());
}

// ========================================================================
// Guards
// ========================================================================

#[test]
fn test_running_kot_on_settled_order_rejected() {
    let (manager, _) = create_test_manager();
    let order_id = open_table(&manager, "T1");
    apply_delta(&manager, &order_id, "coffee", 2);
    print_bill(&manager, &order_id);
    settle_in_full(&manager, &order_id);

    let result = manager.print_running_kot(&order_id);
    assert!(matches!(result, Err(ManagerError::InvalidState(_))));
}

#[test]
fn test_running_kot_on_cancelled_order_rejected() {
    let (manager, _) = create_test_manager();
    let order_id = open_table(&manager, "T1");
    let resp = manager.execute_command(cmd(OrderCommandPayload::CancelOrder {
        order_id: order_id.clone(),
        reason: "changed tables".to_string(),
    }));
    assert!(resp.success);

    let result = manager.print_running_kot(&order_id);
    assert!(matches!(result, Err(ManagerError::InvalidState(_))));
}

#[test]
fn test_running_kot_on_missing_order_rejected() {
    let (manager, _) = create_test_manager();
    let result = manager.print_running_kot("no-such-order");
    assert!(matches!(result, Err(ManagerError::OrderNotFound(_))));
}
