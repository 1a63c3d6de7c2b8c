//! # Pricing Calculator
//!
//! Pure pricing functions shared by live cart edits and reload recovery.
//! Both paths MUST go through these helpers; if they computed prices
//! independently they could disagree on rounding or clamp behavior.
//!
//! ## The Ordering Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Line Computation Order (never varies)                      │
//! │                                                                         │
//! │  base column price (retail | wholesale)                                │
//! │       │                                                                 │
//! │       ▼  + variant price adjustment                                    │
//! │  unit price                                                            │
//! │       │                                                                 │
//! │       ▼  + manual per-unit adjustment (flat amount ÷ quantity)         │
//! │  effective unit price                                                  │
//! │       │                                                                 │
//! │       ▼  × quantity                                                    │
//! │  gross (pre-discount subtotal)                                         │
//! │       │                                                                 │
//! │       ▼  − line discount (clamped to gross)                            │
//! │  line subtotal                                                         │
//! │                                                                         │
//! │  Σ line subtotals − order discount (once, clamped) = total, floor 0    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::discount::Discount;
use crate::money::Money;
use crate::types::{CustomerType, Product, ProductVariant};

/// Resolves the unit price of a product (optionally at a variant) for the
/// given customer type.
///
/// The variant adjustment is signed; a negative delta below the base price
/// is allowed, but the unit price never resolves below zero.
pub fn resolve_unit_price(
    product: &Product,
    variant: Option<&ProductVariant>,
    customer_type: CustomerType,
) -> Money {
    let base = product.base_price(customer_type);
    let adjustment = variant
        .map(|v| Money::from_cents(v.price_adjustment_cents))
        .unwrap_or_default();
    (base + adjustment).floor_zero()
}

/// Display name for a line: product name, with the variant label appended
/// when one is selected.
pub fn line_display_name(product: &Product, variant: Option<&ProductVariant>) -> String {
    match variant {
        Some(v) => format!("{} ({})", product.name, v.label),
        None => product.name.clone(),
    }
}

/// Derives the per-unit share of a flat manual adjustment.
///
/// The flat amount is split evenly across units, rounding half-up. Once
/// derived, the per-unit figure is what later quantity changes preserve.
pub fn per_unit_adjustment(flat: Money, quantity: i64) -> Money {
    if quantity <= 0 {
        return Money::zero();
    }
    flat.split_per_unit(quantity)
}

/// Pre-discount subtotal of a line.
pub fn line_gross(unit_price: Money, manual_unit_adjustment: Money, quantity: i64) -> Money {
    (unit_price + manual_unit_adjustment).multiply_quantity(quantity)
}

/// Line subtotal after the line discount.
///
/// The discount is clamped against the gross, so the result is never
/// negative.
pub fn line_subtotal(gross: Money, discount: Discount) -> Money {
    (gross - discount.amount_against(gross)).floor_zero()
}

/// Order total: subtotal minus the order-level discount, floored at zero.
pub fn order_total(subtotal: Money, discount: Discount) -> Money {
    (subtotal - discount.amount_against(subtotal)).floor_zero()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(retail: i64, wholesale: i64) -> Product {
        Product {
            id: "p1".to_string(),
            sku: "SKU-1".to_string(),
            barcode: None,
            name: "Olive Oil".to_string(),
            description: None,
            retail_price_cents: retail,
            wholesale_price_cents: wholesale,
            current_stock: 10,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn variant(delta: i64) -> ProductVariant {
        ProductVariant {
            id: "v1".to_string(),
            product_id: "p1".to_string(),
            label: "500ml".to_string(),
            barcode: None,
            price_adjustment_cents: delta,
        }
    }

    #[test]
    fn test_resolve_unit_price_by_customer_type() {
        let p = product(2500, 2000);
        assert_eq!(
            resolve_unit_price(&p, None, CustomerType::Retail).cents(),
            2500
        );
        assert_eq!(
            resolve_unit_price(&p, None, CustomerType::Wholesale).cents(),
            2000
        );
    }

    #[test]
    fn test_resolve_unit_price_with_variant_adjustment() {
        let p = product(2500, 2000);
        let v = variant(300);
        assert_eq!(
            resolve_unit_price(&p, Some(&v), CustomerType::Retail).cents(),
            2800
        );
        assert_eq!(
            resolve_unit_price(&p, Some(&v), CustomerType::Wholesale).cents(),
            2300
        );
    }

    #[test]
    fn test_resolve_unit_price_never_negative() {
        let p = product(200, 200);
        let v = variant(-500);
        assert_eq!(
            resolve_unit_price(&p, Some(&v), CustomerType::Retail).cents(),
            0
        );
    }

    #[test]
    fn test_line_display_name() {
        let p = product(2500, 2000);
        assert_eq!(line_display_name(&p, None), "Olive Oil");
        assert_eq!(line_display_name(&p, Some(&variant(0))), "Olive Oil (500ml)");
    }

    #[test]
    fn test_per_unit_adjustment_rounds_half_up() {
        assert_eq!(per_unit_adjustment(Money::from_cents(500), 3).cents(), 167);
        assert_eq!(per_unit_adjustment(Money::from_cents(500), 0).cents(), 0);
    }

    #[test]
    fn test_line_math_ordering() {
        // unit 2500 + manual per-unit 100, qty 3 => gross 7800
        let gross = line_gross(Money::from_cents(2500), Money::from_cents(100), 3);
        assert_eq!(gross.cents(), 7800);

        // 10% off 7800 => 780, subtotal 7020
        let subtotal = line_subtotal(gross, Discount::Percent(1000));
        assert_eq!(subtotal.cents(), 7020);
    }

    #[test]
    fn test_order_total_floors_at_zero() {
        let total = order_total(Money::from_cents(500), Discount::Amount(10_000));
        assert_eq!(total.cents(), 0);
    }
}
