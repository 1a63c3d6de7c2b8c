//! # Domain Types
//!
//! Core domain types used throughout Vela POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Customer     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku / barcode  │   │  name           │   │  totals         │       │
//! │  │  retail price   │   │  customer_type  │   │  payment_method │       │
//! │  │  wholesale price│   └─────────────────┘   │  operator_name  │       │
//! │  │  current_stock  │                         └─────────────────┘       │
//! │  └────────┬────────┘                                                   │
//! │           │ 1:N                                                        │
//! │  ┌────────┴────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ProductVariant  │   │  CustomerType   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  label          │   │  Retail         │   │  Cash           │       │
//! │  │  barcode        │   │  Wholesale      │   │  Card           │       │
//! │  │  price delta    │   └─────────────────┘   │  Pix            │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The customer type selects which base price column a line item resolves
//! against; the variant contributes an additive price adjustment on top.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::{WALK_IN_CUSTOMER_ID, WALK_IN_CUSTOMER_NAME};

// =============================================================================
// Customer
// =============================================================================

/// Which price column a customer resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    /// Walk-in retail pricing.
    #[default]
    Retail,
    /// Wholesale pricing for registered resellers.
    Wholesale,
}

/// A customer bound to the current sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the terminal and on receipts.
    pub name: String,

    /// Determines the price column for every line in the cart.
    pub customer_type: CustomerType,
}

impl Customer {
    /// The well-known walk-in customer every new cart is bound to.
    pub fn walk_in() -> Self {
        Customer {
            id: WALK_IN_CUSTOMER_ID.to_string(),
            name: WALK_IN_CUSTOMER_NAME.to_string(),
            customer_type: CustomerType::Retail,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the sale is paid.
///
/// A cart starts with no method selected; one must be chosen before the
/// sale can be finalized.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Instant bank transfer.
    Pix,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Barcode of the base unit (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Retail price in cents (walk-in customers).
    pub retail_price_cents: i64,

    /// Wholesale price in cents (reseller customers).
    pub wholesale_price_cents: i64,

    /// Current stock level.
    pub current_stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the base price for the given customer type.
    #[inline]
    pub fn base_price(&self, customer_type: CustomerType) -> Money {
        match customer_type {
            CustomerType::Retail => Money::from_cents(self.retail_price_cents),
            CustomerType::Wholesale => Money::from_cents(self.wholesale_price_cents),
        }
    }
}

/// A packaged size/unit option of a product.
///
/// Variants carry their own barcode and an additive price adjustment over
/// the product's base price column.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductVariant {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product this variant belongs to.
    pub product_id: String,

    /// Display label, e.g. "500ml" or "Box of 12".
    pub label: String,

    /// Variant-specific barcode.
    pub barcode: Option<String>,

    /// Signed price delta in cents, added to the base column price.
    pub price_adjustment_cents: i64,
}

/// A product together with its variants, as returned by catalog lookups.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductRecord {
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}

impl ProductRecord {
    /// Looks up a variant by id.
    pub fn variant(&self, variant_id: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }
}

/// The result of a barcode lookup: the matched product record, and the
/// variant id when the code belonged to a variant rather than the base unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeHit {
    pub record: ProductRecord,
    pub variant_id: Option<String>,
}

// =============================================================================
// Order
// =============================================================================

/// A committed sale.
/// Totals and discount figures are frozen at finalization time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    /// Customer name at time of sale (frozen).
    pub customer_name: String,
    pub subtotal_cents: i64,
    /// Order-level discount, both representations as charged.
    pub discount_percent_bps: u32,
    pub discount_amount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    /// Salesperson who rang the sale up.
    pub operator_name: String,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line item in a committed sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    /// Display name at time of sale (frozen).
    pub name_snapshot: String,
    /// Effective unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// Discount applied to this line, in cents.
    pub discount_cents: i64,
    /// Line subtotal after discount.
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
