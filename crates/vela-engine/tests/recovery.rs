//! Snapshot persistence and reload recovery: what survives a terminal
//! restart, what gets clamped, what gets dropped.

mod common;

use common::{harness, record, restart, with_variant};
use vela_core::{Discount, PaymentMethod, CART_SNAPSHOT_KEY};

#[tokio::test]
async fn mutations_write_the_snapshot_and_emptying_deletes_it() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));

    assert!(!h.session.has_persisted_data().await);

    h.session.add_item("a", Some(2), None).await.unwrap();
    assert!(h.session.has_persisted_data().await);

    // A cart holding only a note is still worth keeping.
    h.session.remove_item("a", None).await.unwrap();
    assert!(!h.session.has_persisted_data().await);

    h.session.set_note("reserved for pickup").await.unwrap();
    assert!(h.session.has_persisted_data().await);

    h.session.set_note("").await.unwrap();
    assert!(!h.session.has_persisted_data().await);
}

#[tokio::test]
async fn clear_deletes_the_snapshot() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(2), None).await.unwrap();

    h.session.clear().await;
    assert!(!h.session.has_persisted_data().await);
    assert!(h.store.get_raw(CART_SNAPSHOT_KEY).is_none());
}

#[tokio::test]
async fn restart_restores_lines_discounts_and_settings() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(3), None).await.unwrap();
    h.session
        .apply_line_discount("a", None, Discount::Percent(1000))
        .await
        .unwrap();
    h.session
        .apply_order_discount(Discount::Amount(200))
        .await
        .unwrap();
    h.session.set_note("no bag").await.unwrap();
    h.session
        .set_payment_method(Some(PaymentMethod::Card))
        .await
        .unwrap();

    let session2 = restart(&h);
    assert!(session2.recover().await);
    assert!(session2.take_restored_notice());
    // The notice is one-time.
    assert!(!session2.take_restored_notice());

    let cart = session2.cart();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.items[0].discount, Discount::Percent(1000));
    assert_eq!(cart.items[0].subtotal_cents, 6750);
    assert_eq!(cart.order_discount, Discount::Amount(200));
    assert_eq!(cart.note, "no bag");
    assert_eq!(cart.payment_method, Some(PaymentMethod::Card));
    assert_eq!(cart.total_cents, 6550);
}

#[tokio::test]
async fn recovery_reprices_from_fresh_catalog_data() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(2), None).await.unwrap();
    h.session
        .apply_line_discount("a", None, Discount::Percent(1000))
        .await
        .unwrap();
    h.session
        .apply_manual_adjustment("a", None, 300)
        .await
        .unwrap();

    // Price changes while the terminal is down. The stale 2500 must not
    // survive the reload.
    h.catalog.set_price("a", 3000, 2400);

    let session2 = restart(&h);
    assert!(session2.recover().await);

    let cart = session2.cart();
    let line = &cart.items[0];
    assert_eq!(line.unit_price_cents, 3000);
    // Flat 300 across 2 units = 150/unit, derived against the fresh price
    assert_eq!(line.manual_unit_adjustment_cents, 150);
    assert_eq!(line.gross_cents, (3000 + 150) * 2);
    // 10% reapplied against the fresh gross
    assert_eq!(line.discount_amount_cents, 630);
    assert_eq!(line.subtotal_cents, 5670);
}

#[tokio::test]
async fn recovery_clamps_quantity_to_current_stock() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(5), None).await.unwrap();

    h.catalog.set_stock("a", 3);

    let session2 = restart(&h);
    assert!(session2.recover().await);
    assert_eq!(session2.cart().items[0].quantity, 3);
}

#[tokio::test]
async fn recovery_drops_missing_inactive_and_out_of_stock_lines() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.catalog.insert(record("b", "Sugar 1kg", 480, 390, 10));
    h.catalog.insert(record("c", "Bar Soap", 250, 190, 10));
    h.catalog.insert(record("d", "Spaghetti 500g", 620, 495, 10));
    for id in ["a", "b", "c", "d"] {
        h.session.add_item(id, Some(1), None).await.unwrap();
    }

    h.catalog.remove("a");
    h.catalog.set_active("b", false);
    h.catalog.set_stock("c", 0);

    let session2 = restart(&h);
    assert!(session2.recover().await);

    let cart = session2.cart();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].product_id, "d");
}

#[tokio::test]
async fn recovery_with_zero_survivors_reports_nothing_to_restore() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(1), None).await.unwrap();

    h.catalog.set_stock("a", 0);

    let session2 = restart(&h);
    assert!(!session2.recover().await);
    assert!(!session2.take_restored_notice());
    assert!(session2.cart().is_empty());
    // The stale snapshot is discarded, not resurrected on the next start.
    assert!(h.store.get_raw(CART_SNAPSHOT_KEY).is_none());
}

#[tokio::test]
async fn malformed_snapshot_is_treated_as_absent() {
    let h = harness();
    h.store.set_raw(CART_SNAPSHOT_KEY, "{ not json ]");

    let session2 = restart(&h);
    assert!(!session2.recover().await);
    assert!(session2.cart().is_empty());
    assert!(h.store.get_raw(CART_SNAPSHOT_KEY).is_none());
}

#[tokio::test]
async fn catalog_outage_aborts_recovery_without_error() {
    let h = harness();
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));
    h.session.add_item("a", Some(2), None).await.unwrap();

    h.catalog.fail_reads(true);

    let session2 = restart(&h);
    assert!(!session2.recover().await);
    assert!(session2.cart().is_empty());
    // The snapshot survives the outage; the next start can retry.
    assert!(h.store.get_raw(CART_SNAPSHOT_KEY).is_some());
}

#[tokio::test]
async fn recovery_drops_lines_whose_variant_vanished() {
    let h = harness();
    h.catalog.insert(with_variant(
        record("a", "Olive Oil", 2500, 2000, 10),
        "v1",
        "500ml",
        300,
    ));
    h.session.add_item("a", Some(1), Some("v1")).await.unwrap();

    // Variant removed from the catalog while the terminal was down.
    h.catalog.insert(record("a", "Olive Oil", 2500, 2000, 10));

    let session2 = restart(&h);
    assert!(!session2.recover().await);
    assert!(session2.cart().is_empty());
}
