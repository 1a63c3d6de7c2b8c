//! # vela-core: Pure Business Logic for Vela POS
//!
//! This crate is the **heart** of the point-of-sale engine. It contains the
//! sale cart, its pricing and discount arithmetic, and the snapshot
//! projection as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vela POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   POS Terminal Frontend                         │   │
//! │  │    Search UI ──► Cart UI ──► Discounts ──► Finalize Dialog     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vela-engine                                  │   │
//! │  │    sale session, stock checks, recovery, finalization          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vela-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  pricing  │  │   │
//! │  │   │  Product  │  │   Money   │  │ SaleCart  │  │ ordering  │  │   │
//! │  │   │  Customer │  │ Discount  │  │ LineItem  │  │   rule    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Order, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`discount`] - Tagged discount value and breakdown derivation
//! - [`cart`] - The sale cart state machine
//! - [`pricing`] - Price resolution and the line computation order
//! - [`snapshot`] - Durable projection of the cart's intent
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod discount;
pub mod error;
pub mod money;
pub mod pricing;
pub mod snapshot;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vela_core::Money` instead of
// `use vela_core::money::Money`

pub use cart::{CartTotals, SaleCart, SaleLineItem};
pub use discount::{Discount, DiscountBreakdown};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use snapshot::{CartSnapshot, SnapshotLine, CART_SNAPSHOT_KEY};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Well-known id of the walk-in customer every new cart is bound to.
///
/// The record is seeded into the catalog database; the constant lets the
/// engine rebind a cleared cart without a lookup.
pub const WALK_IN_CUSTOMER_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Display name of the walk-in customer.
pub const WALK_IN_CUSTOMER_NAME: &str = "Walk-in customer";

/// Maximum distinct lines allowed in a single cart.
///
/// Prevents runaway carts and keeps transaction sizes reasonable.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in the cart.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
