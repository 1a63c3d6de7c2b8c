//! # Cart Snapshot
//!
//! Minimal durable projection of the cart, written to the local store after
//! every mutation and replayed on session start.
//!
//! Prices, names and stock figures are deliberately NOT persisted: after a
//! reload they are untrustworthy and must be refetched from the catalog.
//! The snapshot records only the operator's intent.

use serde::{Deserialize, Serialize};

use crate::cart::SaleCart;
use crate::discount::Discount;
use crate::types::PaymentMethod;

/// Fixed key the snapshot is stored under in the local key/value store.
pub const CART_SNAPSHOT_KEY: &str = "vela.pos.cart";

/// One persisted line: the `(product, variant)` key plus the operator's
/// quantity, discount and manual adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotLine {
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub discount: Discount,
    #[serde(default)]
    pub manual_adjustment_cents: Option<i64>,
}

/// The persisted cart projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub lines: Vec<SnapshotLine>,
    #[serde(default)]
    pub order_discount: Discount,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl CartSnapshot {
    /// Projects the current cart down to its persistable intent.
    pub fn capture(cart: &SaleCart) -> Self {
        CartSnapshot {
            lines: cart
                .items
                .iter()
                .map(|i| SnapshotLine {
                    product_id: i.product_id.clone(),
                    variant_id: i.variant_id.clone(),
                    quantity: i.quantity,
                    discount: i.discount,
                    manual_adjustment_cents: i.manual_adjustment_cents,
                })
                .collect(),
            order_discount: cart.order_discount,
            note: cart.note.clone(),
            payment_method: cart.payment_method,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Product, ProductRecord};
    use chrono::Utc;

    fn record(id: &str, price: i64) -> ProductRecord {
        ProductRecord {
            product: Product {
                id: id.to_string(),
                sku: format!("SKU-{}", id),
                barcode: None,
                name: format!("Product {}", id),
                description: None,
                retail_price_cents: price,
                wholesale_price_cents: price,
                current_stock: 50,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            variants: Vec::new(),
        }
    }

    #[test]
    fn test_capture_keeps_intent_only() {
        let mut cart = SaleCart::new();
        cart.add_line(&record("1", 2500), None, 3, 50).unwrap();
        cart.apply_line_discount("1", None, Discount::Percent(1000)).unwrap();
        cart.apply_manual_adjustment("1", None, 500).unwrap();
        cart.apply_order_discount(Discount::Amount(200));
        cart.set_note("no bag");
        cart.set_payment_method(Some(PaymentMethod::Card));

        let snapshot = CartSnapshot::capture(&cart);
        assert_eq!(snapshot.lines.len(), 1);
        assert_eq!(snapshot.lines[0].product_id, "1");
        assert_eq!(snapshot.lines[0].quantity, 3);
        assert_eq!(snapshot.lines[0].discount, Discount::Percent(1000));
        assert_eq!(snapshot.lines[0].manual_adjustment_cents, Some(500));
        assert_eq!(snapshot.order_discount, Discount::Amount(200));
        assert_eq!(snapshot.note, "no bag");
        assert_eq!(snapshot.payment_method, Some(PaymentMethod::Card));
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let snapshot = CartSnapshot {
            lines: vec![SnapshotLine {
                product_id: "p1".to_string(),
                variant_id: Some("v1".to_string()),
                quantity: 2,
                discount: Discount::Amount(150),
                manual_adjustment_cents: None,
            }],
            order_discount: Discount::None,
            note: String::new(),
            payment_method: None,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: CartSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        // Older payloads without discount/note fields still parse
        let json = r#"{"lines":[{"productId":"p1","quantity":1}]}"#;
        let snapshot: CartSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.lines[0].discount, Discount::None);
        assert!(snapshot.payment_method.is_none());
    }
}
