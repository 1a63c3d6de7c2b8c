//! End-to-end sale flow: add items, discounts, customer switch, stock
//! rejections and the full finalize sequence against in-memory services.

mod common;

use common::{harness, record, with_variant};
use vela_core::{CoreError, Customer, CustomerType, Discount, PaymentMethod};
use vela_engine::EngineError;

#[tokio::test]
async fn add_item_computes_totals() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));

    let cart = h.session.add_item("a", Some(3), None).await.unwrap();

    assert_eq!(cart.subtotal_cents, 7500);
    assert_eq!(cart.total_cents, 7500);
    assert_eq!(cart.items[0].available_stock, 10);
}

#[tokio::test]
async fn order_discount_then_quantity_change_recomputes() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));

    h.session.add_item("a", Some(3), None).await.unwrap();
    let cart = h
        .session
        .apply_order_discount(Discount::Percent(1000))
        .await
        .unwrap();
    assert_eq!(cart.order_discount_amount_cents, 750);
    assert_eq!(cart.total_cents, 6750);

    // Raising the quantity recomputes the order discount against the new
    // subtotal instead of carrying the old amount forward.
    let cart = h.session.update_quantity("a", None, 5).await.unwrap();
    assert_eq!(cart.subtotal_cents, 12_500);
    assert_eq!(cart.order_discount_amount_cents, 1250);
    assert_eq!(cart.total_cents, 11_250);
}

#[tokio::test]
async fn wholesale_switch_reprices_lines_and_discount() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));

    h.session.add_item("a", Some(5), None).await.unwrap();
    h.session
        .apply_order_discount(Discount::Percent(1000))
        .await
        .unwrap();

    let cart = h
        .session
        .set_customer(Customer {
            id: "c1".to_string(),
            name: "Mercado Azul".to_string(),
            customer_type: CustomerType::Wholesale,
        })
        .await
        .unwrap();

    assert_eq!(cart.subtotal_cents, 10_000);
    assert_eq!(cart.order_discount_amount_cents, 1000);
    assert_eq!(cart.total_cents, 9000);
    assert_eq!(cart.customer_name, "Mercado Azul");
}

#[tokio::test]
async fn customer_switch_fetch_failure_leaves_cart_untouched() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(2), None).await.unwrap();

    h.catalog.fail_reads(true);
    let err = h
        .session
        .set_customer(Customer {
            id: "c1".to_string(),
            name: "Mercado Azul".to_string(),
            customer_type: CustomerType::Wholesale,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Service(_)));

    let cart = h.session.cart();
    assert_eq!(cart.customer_type, CustomerType::Retail);
    assert_eq!(cart.items[0].unit_price_cents, 2500);
}

#[tokio::test]
async fn same_type_customer_change_is_a_field_merge() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(2), None).await.unwrap();

    // Catalog offline, but no refetch is needed for a same-type change.
    h.catalog.fail_reads(true);
    let cart = h
        .session
        .set_customer(Customer {
            id: "c2".to_string(),
            name: "Maria".to_string(),
            customer_type: CustomerType::Retail,
        })
        .await
        .unwrap();
    assert_eq!(cart.customer_name, "Maria");
    assert_eq!(cart.items[0].unit_price_cents, 2500);
}

#[tokio::test]
async fn over_stock_add_is_rejected_with_detail() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(3), None).await.unwrap();

    // 3 in cart + 8 requested = 11 > 10
    let err = h.session.add_item("a", Some(8), None).await.unwrap_err();
    match err {
        EngineError::Core(CoreError::InsufficientStock {
            available,
            requested,
            ..
        }) => {
            assert_eq!(available, 10);
            assert_eq!(requested, 11);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Cart unchanged
    assert_eq!(h.session.cart().total_quantity(), 3);
}

#[tokio::test]
async fn over_stock_quantity_update_is_rejected() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(3), None).await.unwrap();

    let err = h.session.update_quantity("a", None, 11).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::InsufficientStock { .. })
    ));
    assert_eq!(h.session.cart().total_quantity(), 3);
}

#[tokio::test]
async fn inactive_product_is_rejected() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.catalog.set_active("a", false);

    let err = h.session.add_item("a", Some(1), None).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::ProductInactive { .. })
    ));
}

#[tokio::test]
async fn barcode_add_resolves_variants() {
    let h = harness();
    h.catalog.insert(with_variant(
        record("a", "Olive Oil", 2500, 2000, 10),
        "v1",
        "500ml",
        300,
    ));

    let cart = h.session.add_item_by_barcode("bar-v1", None).await.unwrap();
    assert_eq!(cart.items[0].variant_id.as_deref(), Some("v1"));
    assert_eq!(cart.items[0].unit_price_cents, 2800);
    assert_eq!(cart.items[0].name, "Olive Oil (500ml)");

    let err = h
        .session
        .add_item_by_barcode("no-such-code", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::ProductNotFound(_))
    ));
}

#[tokio::test]
async fn manual_adjustment_round_trip_via_session() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(3), None).await.unwrap();

    let cart = h
        .session
        .apply_manual_adjustment("a", None, 500)
        .await
        .unwrap();
    assert_eq!(cart.items[0].manual_unit_adjustment_cents, 167);
    assert_eq!(cart.subtotal_cents, (2500 + 167) * 3);

    let err = h
        .session
        .apply_manual_adjustment("a", None, -50)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Core(CoreError::Validation(_))));

    let cart = h.session.remove_manual_adjustment("a", None).await.unwrap();
    assert_eq!(cart.subtotal_cents, 7500);
}

#[tokio::test]
async fn finalize_without_payment_method_is_rejected_before_io() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(3), None).await.unwrap();

    // Both backends offline: preconditions must fail before any call.
    h.catalog.fail_reads(true);
    h.orders.fail_orders(true);

    let err = h.session.finalize("Ana").await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::MissingPaymentMethod)
    ));
    assert_eq!(h.session.cart().total_quantity(), 3);
    assert!(h.orders.orders().is_empty());
}

#[tokio::test]
async fn finalize_requires_operator_and_lines() {
    let h = harness();

    let err = h.session.finalize("Ana").await.unwrap_err();
    assert!(matches!(err, EngineError::Core(CoreError::EmptyCart)));

    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(1), None).await.unwrap();
    h.session
        .set_payment_method(Some(PaymentMethod::Cash))
        .await
        .unwrap();

    let err = h.session.finalize("   ").await.unwrap_err();
    assert!(matches!(err, EngineError::Core(CoreError::Validation(_))));
}

#[tokio::test]
async fn finalize_aborts_on_stock_shortfall_with_itemized_errors() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.catalog.insert(record("b", "Sugar 1kg", 480, 390, 10));
    h.session.add_item("a", Some(3), None).await.unwrap();
    h.session.add_item("b", Some(2), None).await.unwrap();
    h.session
        .set_payment_method(Some(PaymentMethod::Card))
        .await
        .unwrap();

    // Stock collapses between the advisory check and finalize.
    h.catalog.set_stock("a", 1);
    h.catalog.set_stock("b", 0);

    let err = h.session.finalize("Ana").await.unwrap_err();
    match &err {
        EngineError::StockValidation { shortfalls } => {
            assert_eq!(shortfalls.len(), 2);
            assert_eq!(shortfalls[0].available, 1);
            assert_eq!(shortfalls[1].requested, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains("Olive Oil: insufficient stock (available 1, requested 3)"));
    assert!(message.contains("Sugar 1kg"));

    // No writes happened and the cart is intact.
    assert!(h.orders.orders().is_empty());
    assert_eq!(h.session.cart().item_count(), 2);
}

#[tokio::test]
async fn finalize_commits_order_lines_and_stock() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(3), None).await.unwrap();
    h.session
        .apply_order_discount(Discount::Percent(1000))
        .await
        .unwrap();
    h.session
        .set_payment_method(Some(PaymentMethod::Pix))
        .await
        .unwrap();
    h.session.set_note("no bag").await.unwrap();

    let outcome = h.session.finalize("Ana").await.unwrap();
    assert!(outcome.stock_sync_warnings.is_empty());
    assert_eq!(outcome.total_cents, 6750);

    let orders = h.orders.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, outcome.order_id);
    assert_eq!(orders[0].subtotal_cents, 7500);
    assert_eq!(orders[0].discount_amount_cents, 750);
    assert_eq!(orders[0].payment_method, PaymentMethod::Pix);
    assert_eq!(orders[0].operator_name, "Ana");
    assert_eq!(orders[0].note.as_deref(), Some("no bag"));

    let lines = h.orders.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].order_id, outcome.order_id);
    assert_eq!(lines[0].quantity, 3);
    assert_eq!(lines[0].subtotal_cents, 7500);

    assert_eq!(h.catalog.decrements(), vec![("a".to_string(), 3)]);

    // Cart cleared and snapshot gone
    assert!(h.session.cart().is_empty());
    assert!(!h.session.has_persisted_data().await);
}

#[tokio::test]
async fn line_creation_failure_keeps_cart_for_retry() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(3), None).await.unwrap();
    h.session
        .set_payment_method(Some(PaymentMethod::Cash))
        .await
        .unwrap();

    h.orders.fail_lines(true);
    let err = h.session.finalize("Ana").await.unwrap_err();
    assert!(matches!(err, EngineError::Service(_)));

    // The order header is orphaned; the cart and snapshot survive so the
    // operator can retry without re-entering items.
    assert_eq!(h.orders.orders().len(), 1);
    assert!(h.orders.lines().is_empty());
    assert_eq!(h.session.cart().total_quantity(), 3);
    assert!(h.session.has_persisted_data().await);
    assert!(h.catalog.decrements().is_empty());

    // Retry succeeds once the backend recovers.
    h.orders.fail_lines(false);
    let outcome = h.session.finalize("Ana").await.unwrap();
    assert!(h.session.cart().is_empty());
    assert_eq!(h.orders.lines().len(), 1);
    assert_eq!(h.orders.lines()[0].order_id, outcome.order_id);
}

#[tokio::test]
async fn stock_decrement_failure_never_fails_the_sale() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(2), None).await.unwrap();
    h.session
        .set_payment_method(Some(PaymentMethod::Cash))
        .await
        .unwrap();

    h.catalog.fail_decrements(true);
    let outcome = h.session.finalize("Ana").await.unwrap();

    assert_eq!(outcome.stock_sync_warnings.len(), 1);
    assert!(outcome.stock_sync_warnings[0].contains("Olive Oil"));
    assert_eq!(h.orders.orders().len(), 1);
    assert!(h.session.cart().is_empty());
}

#[tokio::test]
async fn ready_to_finalize_tracks_lines_and_payment() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));

    assert!(!h.session.ready_to_finalize());
    h.session.add_item("a", Some(1), None).await.unwrap();
    assert!(!h.session.ready_to_finalize());
    h.session
        .set_payment_method(Some(PaymentMethod::Cash))
        .await
        .unwrap();
    assert!(h.session.ready_to_finalize());

    let totals = h.session.totals();
    assert_eq!(totals.item_count, 1);
    assert_eq!(totals.total_cents, 2500);
}
