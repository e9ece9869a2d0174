//! Tests for purchase order generation: supplier grouping, zero-quantity
//! skipping, stock sufficiency, and the ordered idempotency flag.

mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use uuid::Uuid;

use warehouse_req_api::{
    entities::{purchase_order, purchase_order_line, requisition_line},
    errors::ServiceError,
};

#[tokio::test]
async fn purchase_orders_group_lines_by_primary_supplier() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;

    let item_a = app.seed_item("ITEM-A", dec!(10.00)).await;
    let item_b = app.seed_item("ITEM-B", dec!(25.50)).await;
    let item_c = app.seed_item("ITEM-C", dec!(4.00)).await;

    let acme = app.seed_supplier("Acme Industrial").await;
    let globex = app.seed_supplier("Globex").await;

    app.link_item_supplier(item_a.id, acme.id, 10).await;
    app.link_item_supplier(item_c.id, acme.id, 10).await;
    // Globex is primary for item B; Acme only backs it up.
    app.link_item_supplier(item_b.id, globex.id, 10).await;
    app.link_item_supplier(item_b.id, acme.id, 20).await;

    let requisition = app.create_draft(dest.id).await;
    let line_a = app
        .add_line(requisition.id, item_a.id, dec!(5), dec!(5), src.id)
        .await;
    let line_b = app
        .add_line(requisition.id, item_b.id, dec!(3), dec!(3), src.id)
        .await;
    let line_c = app
        .add_line(requisition.id, item_c.id, dec!(2), dec!(2), src.id)
        .await;
    app.approve_as(requisition.id, Uuid::new_v4()).await;

    let orders = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .expect("generate purchase orders");

    // One order per supplier, in first-line order: Acme before Globex.
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].supplier_id, acme.id);
    assert_eq!(orders[1].supplier_id, globex.id);
    for order in &orders {
        assert_eq!(order.origin, requisition.folio);
        assert_eq!(order.planned_date, requisition.date_required);
        assert_eq!(order.status, purchase_order::PurchaseOrderStatus::Draft);
    }

    let acme_lines = app
        .state
        .services
        .procurement
        .list_purchase_order_lines(orders[0].id)
        .await
        .expect("list acme order lines");
    assert_eq!(acme_lines.len(), 2);
    assert_eq!(acme_lines[0].requisition_line_id, line_a.id);
    assert_eq!(acme_lines[0].quantity, dec!(5));
    assert_eq!(acme_lines[0].unit_price, item_a.list_price);
    assert_eq!(acme_lines[0].uom_code, item_a.primary_uom_code);
    assert_eq!(acme_lines[1].requisition_line_id, line_c.id);
    assert_eq!(acme_lines[1].quantity, dec!(2));

    let globex_lines = app
        .state
        .services
        .procurement
        .list_purchase_order_lines(orders[1].id)
        .await
        .expect("list globex order lines");
    assert_eq!(globex_lines.len(), 1);
    assert_eq!(globex_lines[0].requisition_line_id, line_b.id);
    assert_eq!(globex_lines[0].unit_price, item_b.list_price);

    // Every line now references the purchase order it was procured on.
    let lines = app
        .state
        .services
        .requisitions
        .list_lines(requisition.id)
        .await
        .expect("list requisition lines");
    assert_eq!(lines[0].purchase_order_id, Some(orders[0].id));
    assert_eq!(lines[1].purchase_order_id, Some(orders[1].id));
    assert_eq!(lines[2].purchase_order_id, Some(orders[0].id));

    let reloaded = app
        .state
        .services
        .requisitions
        .get_requisition(requisition.id)
        .await
        .expect("reload requisition");
    assert!(reloaded.ordered);
}

#[tokio::test]
async fn zero_ordered_lines_are_skipped_entirely() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;

    // Item A has no supplier and no stock; with nothing ordered it must not
    // be validated at all.
    let item_a = app.seed_item("ITEM-A", dec!(10.00)).await;
    let item_b = app.seed_item("ITEM-B", dec!(25.50)).await;
    let globex = app.seed_supplier("Globex").await;
    app.link_item_supplier(item_b.id, globex.id, 10).await;

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, item_a.id, dec!(5), dec!(0), src.id)
        .await;
    app.add_line(requisition.id, item_b.id, dec!(2), dec!(2), src.id)
        .await;
    app.approve_as(requisition.id, Uuid::new_v4()).await;

    let orders = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .expect("generate purchase orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].supplier_id, globex.id);

    let lines = app
        .state
        .services
        .requisitions
        .list_lines(requisition.id)
        .await
        .expect("list lines");
    assert_eq!(lines[0].purchase_order_id, None);
    assert_eq!(lines[1].purchase_order_id, Some(orders[0].id));
}

#[tokio::test]
async fn all_zero_run_creates_nothing_but_claims_the_flag() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, item.id, dec!(5), dec!(0), src.id)
        .await;
    app.add_line(requisition.id, item.id, dec!(3), dec!(0), src.id)
        .await;
    app.approve_as(requisition.id, Uuid::new_v4()).await;

    let orders = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .expect("all-zero generation succeeds");
    assert!(orders.is_empty());

    let reloaded = app
        .state
        .services
        .requisitions
        .get_requisition(requisition.id)
        .await
        .expect("reload requisition");
    assert!(reloaded.ordered, "flag must be claimed even with no orders");

    let total = purchase_order::Entity::find()
        .count(app.state.db.as_ref())
        .await
        .expect("count purchase orders");
    assert_eq!(total, 0);

    // The run is spent; a retry is refused.
    let err = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn missing_supplier_fails_and_rolls_everything_back() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;

    let orphan = app.seed_item("ITEM-ORPHAN", dec!(10.00)).await;
    let item_b = app.seed_item("ITEM-B", dec!(25.50)).await;
    let globex = app.seed_supplier("Globex").await;
    app.link_item_supplier(item_b.id, globex.id, 10).await;

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, orphan.id, dec!(2), dec!(2), src.id)
        .await;
    app.add_line(requisition.id, item_b.id, dec!(4), dec!(4), src.id)
        .await;
    app.approve_as(requisition.id, Uuid::new_v4()).await;

    let err = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    // The failed run leaves no trace: no orders, flag still clear.
    let reloaded = app
        .state
        .services
        .requisitions
        .get_requisition(requisition.id)
        .await
        .expect("reload requisition");
    assert!(!reloaded.ordered);
    let total = purchase_order::Entity::find()
        .count(app.state.db.as_ref())
        .await
        .expect("count purchase orders");
    assert_eq!(total, 0);

    // Fixing the catalog makes the same run succeed.
    let acme = app.seed_supplier("Acme Industrial").await;
    app.link_item_supplier(orphan.id, acme.id, 10).await;
    let orders = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .expect("generation succeeds after supplier fix");
    assert_eq!(orders.len(), 2);
}

#[tokio::test]
async fn negative_ordered_quantity_fails_the_run() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;

    let item_a = app.seed_item("ITEM-A", dec!(10.00)).await;
    let item_b = app.seed_item("ITEM-B", dec!(25.50)).await;
    let acme = app.seed_supplier("Acme Industrial").await;
    app.link_item_supplier(item_a.id, acme.id, 10).await;
    app.link_item_supplier(item_b.id, acme.id, 10).await;

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, item_a.id, dec!(5), dec!(5), src.id)
        .await;
    // The service refuses negative quantities, so corrupt the row directly.
    requisition_line::ActiveModel {
        id: Set(Uuid::new_v4()),
        requisition_id: Set(requisition.id),
        line_number: Set(2),
        item_id: Set(item_b.id),
        requested_qty: Set(dec!(1)),
        ordered_qty: Set(dec!(-1)),
        source_location_id: Set(src.id),
        purchase_order_id: Set(None),
        stock_picking_id: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(app.state.db.as_ref())
    .await
    .expect("seed corrupted line");
    app.approve_as(requisition.id, Uuid::new_v4()).await;

    let err = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let reloaded = app
        .state
        .services
        .requisitions
        .get_requisition(requisition.id)
        .await
        .expect("reload requisition");
    assert!(!reloaded.ordered);
}

#[tokio::test]
async fn insufficient_stock_fails_the_run() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;

    let item = app.seed_item("ITEM-A", dec!(10.00)).await;
    let acme = app.seed_supplier("Acme Industrial").await;
    app.link_item_supplier(item.id, acme.id, 10).await;
    // 5 on hand plus 3 on order cannot cover 10 requested.
    app.set_on_hand(item.id, src.id, dec!(5)).await;

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, item.id, dec!(10), dec!(3), src.id)
        .await;
    app.approve_as(requisition.id, Uuid::new_v4()).await;

    let err = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let reloaded = app
        .state
        .services
        .requisitions
        .get_requisition(requisition.id)
        .await
        .expect("reload requisition");
    assert!(!reloaded.ordered);

    // On-hand counts across every location, so topping up a second
    // location unblocks the run.
    let overflow = app.seed_location("OVERFLOW").await;
    app.set_on_hand(item.id, overflow.id, dec!(2)).await;
    let orders = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .expect("generation succeeds once stock suffices");
    assert_eq!(orders.len(), 1);
}

#[tokio::test]
async fn generation_requires_an_approved_requisition() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;
    let acme = app.seed_supplier("Acme Industrial").await;
    app.link_item_supplier(item.id, acme.id, 10).await;

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, item.id, dec!(2), dec!(2), src.id)
        .await;

    let err = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));

    app.state
        .services
        .requisitions
        .mark_required(requisition.id)
        .await
        .expect("mark required");
    let err = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));
}

#[tokio::test]
async fn repeat_generation_is_rejected() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;
    let acme = app.seed_supplier("Acme Industrial").await;
    app.link_item_supplier(item.id, acme.id, 10).await;

    let requisition = app.create_draft(dest.id).await;
    let line = app
        .add_line(requisition.id, item.id, dec!(2), dec!(2), src.id)
        .await;
    app.approve_as(requisition.id, Uuid::new_v4()).await;

    let orders = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .expect("first generation");
    assert_eq!(orders.len(), 1);

    let err = app
        .state
        .services
        .procurement
        .generate_purchase_orders(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    // The original documents are untouched by the refused retry.
    let total = purchase_order::Entity::find()
        .count(app.state.db.as_ref())
        .await
        .expect("count purchase orders");
    assert_eq!(total, 1);
    let line_total = purchase_order_line::Entity::find()
        .count(app.state.db.as_ref())
        .await
        .expect("count purchase order lines");
    assert_eq!(line_total, 1);

    let lines = app
        .state
        .services
        .requisitions
        .list_lines(requisition.id)
        .await
        .expect("list lines");
    assert_eq!(lines[0].id, line.id);
    assert_eq!(lines[0].purchase_order_id, Some(orders[0].id));
}
