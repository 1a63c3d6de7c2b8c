//! # Sale Cart
//!
//! The in-progress sale: an ordered collection of line items plus the
//! customer binding, order-level discount, payment method and note.
//!
//! ## State Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Terminal Action          Cart Operation           State Change         │
//! │  ───────────────          ──────────────           ────────────         │
//! │                                                                         │
//! │  Scan / click product ──► add_line() ────────────► upsert by key       │
//! │  Change quantity ───────► set_line_quantity() ───► qty + recompute     │
//! │  Remove line ───────────► remove_line() ─────────► drop + recompute    │
//! │  Give discount ─────────► apply_*_discount() ────► clamp + recompute   │
//! │  Negotiate price ───────► apply_manual_adjustment() ► per-unit derive  │
//! │  Switch customer ───────► reprice_line() per line ► new price column   │
//! │  Cancel sale ───────────► clear() ───────────────► empty walk-in cart  │
//! │                                                                         │
//! │  Every operation either returns Ok with totals recomputed, or an       │
//! │  error with the cart EXACTLY as it was. There are no partial writes.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are keyed by `(product_id, variant_id)`; insertion order is
//! display order. All arithmetic goes through [`crate::pricing`] so that
//! live edits and reload recovery can never diverge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::discount::Discount;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing;
use crate::types::{Customer, CustomerType, PaymentMethod, ProductRecord};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Line Item
// =============================================================================

/// One product (optionally at a specific variant) in the cart.
///
/// ## Design Notes
/// - `unit_price_cents` is the resolved base column price plus the variant
///   adjustment, frozen when the line is added. The original figure is
///   retained even while a manual adjustment is active, so removing the
///   adjustment is fully reversible.
/// - `discount` is the authoritative tag; `discount_percent_bps` and
///   `discount_amount_cents` are the derived pair kept for display.
/// - `gross_cents` and `subtotal_cents` are derived but stored, so callers
///   never recompute them ad hoc.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLineItem {
    /// Product ID (UUID). Immutable once added.
    pub product_id: String,

    /// Variant ID when a packaged option was selected. Immutable once added.
    pub variant_id: Option<String>,

    /// SKU at time of adding (frozen).
    pub sku: String,

    /// Display name at time of adding, variant label included (frozen).
    pub name: String,

    /// Quantity in cart. Always a positive integer.
    pub quantity: i64,

    /// Resolved unit price in cents (base column + variant adjustment).
    pub unit_price_cents: i64,

    /// Operator-entered flat adjustment for the whole line, in cents.
    pub manual_adjustment_cents: Option<i64>,

    /// Per-unit share of the flat adjustment, derived when it was applied.
    /// Quantity changes preserve this figure, not the flat total.
    pub manual_unit_adjustment_cents: i64,

    /// Active discount for this line.
    pub discount: Discount,

    /// Derived discount percentage in basis points (display).
    pub discount_percent_bps: u32,

    /// Derived discount amount in cents (display and arithmetic).
    pub discount_amount_cents: i64,

    /// Pre-discount subtotal: effective unit price × quantity.
    pub gross_cents: i64,

    /// Line subtotal: gross minus discount amount. Never negative.
    pub subtotal_cents: i64,

    /// Stock level reported by the last advisory check.
    pub available_stock: i64,
}

impl SaleLineItem {
    /// Builds a new line from a catalog record.
    ///
    /// Resolves the variant, the price column for the customer type and the
    /// frozen display fields. The caller has already verified stock.
    pub fn from_record(
        record: &ProductRecord,
        variant_id: Option<&str>,
        quantity: i64,
        customer_type: CustomerType,
        available_stock: i64,
    ) -> CoreResult<Self> {
        let variant = match variant_id {
            Some(vid) => Some(record.variant(vid).ok_or_else(|| {
                CoreError::VariantNotFound {
                    product_id: record.product.id.clone(),
                    variant_id: vid.to_string(),
                }
            })?),
            None => None,
        };

        let unit_price = pricing::resolve_unit_price(&record.product, variant, customer_type);

        let mut line = SaleLineItem {
            product_id: record.product.id.clone(),
            variant_id: variant.map(|v| v.id.clone()),
            sku: record.product.sku.clone(),
            name: pricing::line_display_name(&record.product, variant),
            quantity,
            unit_price_cents: unit_price.cents(),
            manual_adjustment_cents: None,
            manual_unit_adjustment_cents: 0,
            discount: Discount::None,
            discount_percent_bps: 0,
            discount_amount_cents: 0,
            gross_cents: 0,
            subtotal_cents: 0,
            available_stock,
        };
        line.recompute();
        Ok(line)
    }

    /// Effective unit price: resolved price plus the manual per-unit share.
    #[inline]
    pub fn effective_unit_price_cents(&self) -> i64 {
        self.unit_price_cents + self.manual_unit_adjustment_cents
    }

    /// Checks whether this line matches a `(product, variant)` key.
    pub fn matches(&self, product_id: &str, variant_id: Option<&str>) -> bool {
        self.product_id == product_id && self.variant_id.as_deref() == variant_id
    }

    /// Recomputes gross, discount breakdown and subtotal.
    ///
    /// Always the same order: effective unit price × quantity = gross,
    /// then the discount is clamped and subtracted.
    fn recompute(&mut self) {
        let gross = pricing::line_gross(
            Money::from_cents(self.unit_price_cents),
            Money::from_cents(self.manual_unit_adjustment_cents),
            self.quantity,
        );
        let breakdown = self.discount.breakdown(gross);

        self.gross_cents = gross.cents();
        self.discount_percent_bps = breakdown.percent_bps;
        self.discount_amount_cents = breakdown.amount_cents;
        self.subtotal_cents = (gross - Money::from_cents(breakdown.amount_cents))
            .floor_zero()
            .cents();
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The whole in-progress transaction.
///
/// ## Invariants
/// - Lines are unique by `(product_id, variant_id)`
/// - `quantity > 0` on every line (setting 0 removes the line)
/// - `subtotal_cents = Σ line subtotals`
/// - `total_cents = max(0, subtotal − order discount amount)`
/// - Maximum distinct lines: 100; maximum quantity per line: 999
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleCart {
    /// Lines in insertion order (display order).
    pub items: Vec<SaleLineItem>,

    /// Customer the sale is bound to.
    pub customer_id: String,
    pub customer_name: String,
    pub customer_type: CustomerType,

    /// Order-level discount, applied once over the sum of line subtotals.
    pub order_discount: Discount,
    pub order_discount_percent_bps: u32,
    pub order_discount_amount_cents: i64,

    /// Selected payment method. Required before finalization.
    pub payment_method: Option<PaymentMethod>,

    /// Free-text note shown on the order.
    pub note: String,

    /// Sum of line subtotals.
    pub subtotal_cents: i64,

    /// Subtotal minus the order discount, floored at zero.
    pub total_cents: i64,

    /// When the cart was created/last cleared.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleCart {
    /// Creates a new empty cart bound to the walk-in customer.
    pub fn new() -> Self {
        let walk_in = Customer::walk_in();
        SaleCart {
            items: Vec::new(),
            customer_id: walk_in.id,
            customer_name: walk_in.name,
            customer_type: walk_in.customer_type,
            order_discount: Discount::None,
            order_discount_percent_bps: 0,
            order_discount_amount_cents: 0,
            payment_method: None,
            note: String::new(),
            subtotal_cents: 0,
            total_cents: 0,
            created_at: Utc::now(),
        }
    }

    /// Looks up a line by `(product, variant)` key.
    pub fn line(&self, product_id: &str, variant_id: Option<&str>) -> Option<&SaleLineItem> {
        self.items
            .iter()
            .find(|i| i.matches(product_id, variant_id))
    }

    fn line_mut(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> CoreResult<&mut SaleLineItem> {
        self.items
            .iter_mut()
            .find(|i| i.matches(product_id, variant_id))
            .ok_or_else(|| CoreError::LineNotFound(product_id.to_string()))
    }

    /// Quantity already in the cart for a `(product, variant)` key.
    ///
    /// Used by callers to compute the combined quantity for stock checks
    /// before a merge-add.
    pub fn quantity_of(&self, product_id: &str, variant_id: Option<&str>) -> i64 {
        self.line(product_id, variant_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Adds a product to the cart or increases quantity if already present.
    ///
    /// ## Behavior
    /// - Inactive products are rejected.
    /// - Existing `(product, variant)` line: quantity increases; the frozen
    ///   unit price is kept, only the advisory stock figure refreshes.
    /// - New line: unit price resolved from the customer type and variant.
    ///
    /// The caller has already run the advisory stock check against the
    /// COMBINED quantity; `available_stock` records its result.
    pub fn add_line(
        &mut self,
        record: &ProductRecord,
        variant_id: Option<&str>,
        quantity: i64,
        available_stock: i64,
    ) -> CoreResult<()> {
        if !record.product.is_active {
            return Err(CoreError::ProductInactive {
                name: record.product.name.clone(),
            });
        }

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|i| i.matches(&record.product.id, variant_id))
        {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            line.available_stock = available_stock;
            line.recompute();
            self.recompute_totals();
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let line = SaleLineItem::from_record(
            record,
            variant_id,
            quantity,
            self.customer_type,
            available_stock,
        )?;
        self.items.push(line);
        self.recompute_totals();
        Ok(())
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - `quantity <= 0` removes the line.
    /// - A percentage discount is reapplied against the new gross; a fixed
    ///   amount is clamped if the gross shrank. The discount never
    ///   compounds.
    /// - The manual per-unit adjustment derived at apply time is preserved
    ///   as is; the flat total it came from is NOT redistributed.
    pub fn set_line_quantity(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: i64,
        available_stock: i64,
    ) -> CoreResult<()> {
        if quantity <= 0 {
            return self.remove_line(product_id, variant_id);
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let line = self.line_mut(product_id, variant_id)?;
        line.quantity = quantity;
        line.available_stock = available_stock;
        line.recompute();
        self.recompute_totals();
        Ok(())
    }

    /// Removes a line from the cart.
    pub fn remove_line(&mut self, product_id: &str, variant_id: Option<&str>) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| !i.matches(product_id, variant_id));

        if self.items.len() == initial_len {
            return Err(CoreError::LineNotFound(product_id.to_string()));
        }
        self.recompute_totals();
        Ok(())
    }

    /// Applies a discount to a line. Clamped against the line gross.
    pub fn apply_line_discount(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
        discount: Discount,
    ) -> CoreResult<()> {
        let line = self.line_mut(product_id, variant_id)?;
        line.discount = discount;
        line.recompute();
        self.recompute_totals();
        Ok(())
    }

    /// Removes the discount from a line, restoring the stored gross as the
    /// line subtotal.
    pub fn clear_line_discount(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> CoreResult<()> {
        self.apply_line_discount(product_id, variant_id, Discount::None)
    }

    /// Applies the order-level discount. Clamped against the subtotal.
    pub fn apply_order_discount(&mut self, discount: Discount) {
        self.order_discount = discount;
        self.recompute_totals();
    }

    /// Removes the order-level discount.
    pub fn clear_order_discount(&mut self) {
        self.apply_order_discount(Discount::None);
    }

    /// Applies a flat manual adjustment to a line's total.
    ///
    /// The amount is distributed as a per-unit share added to the effective
    /// unit price. Negative amounts are rejected; the resolved unit price
    /// is retained so the adjustment can be removed exactly.
    pub fn apply_manual_adjustment(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
        amount_cents: i64,
    ) -> CoreResult<()> {
        if amount_cents < 0 {
            return Err(CoreError::NegativeAdjustment);
        }
        let line = self.line_mut(product_id, variant_id)?;
        line.manual_adjustment_cents = Some(amount_cents);
        line.manual_unit_adjustment_cents =
            pricing::per_unit_adjustment(Money::from_cents(amount_cents), line.quantity).cents();
        line.recompute();
        self.recompute_totals();
        Ok(())
    }

    /// Removes the manual adjustment from a line.
    pub fn clear_manual_adjustment(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> CoreResult<()> {
        let line = self.line_mut(product_id, variant_id)?;
        line.manual_adjustment_cents = None;
        line.manual_unit_adjustment_cents = 0;
        line.recompute();
        self.recompute_totals();
        Ok(())
    }

    /// Re-resolves a line's unit price, preserving discount and adjustment.
    ///
    /// Used when the customer type changes and during reload recovery: the
    /// caller fetches fresh catalog data, resolves the new price through
    /// [`pricing::resolve_unit_price`] and hands it in. The manual per-unit
    /// share is re-derived from the stored flat amount against the current
    /// quantity, and the discount is reapplied against the new gross.
    pub fn reprice_line(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
        unit_price: Money,
    ) -> CoreResult<()> {
        let line = self.line_mut(product_id, variant_id)?;
        line.unit_price_cents = unit_price.cents();
        if let Some(flat) = line.manual_adjustment_cents {
            line.manual_unit_adjustment_cents =
                pricing::per_unit_adjustment(Money::from_cents(flat), line.quantity).cents();
        }
        line.recompute();
        self.recompute_totals();
        Ok(())
    }

    /// Rebinds the customer fields. Does not touch prices; callers that
    /// change the customer TYPE must reprice every line afterwards.
    pub fn rebind_customer(&mut self, customer: &Customer) {
        self.customer_id = customer.id.clone();
        self.customer_name = customer.name.clone();
        self.customer_type = customer.customer_type;
    }

    /// Sets or clears the payment method.
    pub fn set_payment_method(&mut self, method: Option<PaymentMethod>) {
        self.payment_method = method;
    }

    /// Sets the free-text note.
    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    /// Resets to an empty cart bound to the walk-in customer.
    pub fn clear(&mut self) {
        *self = SaleCart::new();
    }

    /// Returns the number of distinct lines in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the cart carries anything worth persisting: at least one
    /// line, an active order discount, or a non-empty note.
    pub fn has_meaningful_state(&self) -> bool {
        !self.items.is_empty() || !self.order_discount.is_none() || !self.note.trim().is_empty()
    }

    /// Whether the cart can be handed to the finalizer: at least one line
    /// and a selected payment method.
    pub fn ready_to_finalize(&self) -> bool {
        !self.items.is_empty() && self.payment_method.is_some()
    }

    /// Recomputes the cart subtotal, the order discount breakdown and the
    /// total. Called by every mutating operation.
    fn recompute_totals(&mut self) {
        let subtotal = Money::from_cents(self.items.iter().map(|i| i.subtotal_cents).sum());
        let breakdown = self.order_discount.breakdown(subtotal);

        self.subtotal_cents = subtotal.cents();
        self.order_discount_percent_bps = breakdown.percent_bps;
        self.order_discount_amount_cents = breakdown.amount_cents;
        self.total_cents = pricing::order_total(subtotal, self.order_discount).cents();
    }
}

impl Default for SaleCart {
    fn default() -> Self {
        SaleCart::new()
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart totals summary for API responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub order_discount_cents: i64,
    pub total_cents: i64,
}

impl From<&SaleCart> for CartTotals {
    fn from(cart: &SaleCart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal_cents: cart.subtotal_cents,
            order_discount_cents: cart.order_discount_amount_cents,
            total_cents: cart.total_cents,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
