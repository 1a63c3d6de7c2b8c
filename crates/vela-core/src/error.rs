//! # Error Types
//!
//! Domain-specific error types for vela-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vela-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vela-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  vela-engine errors (separate crate)                                   │
//! │  ├── ServiceError     - Catalog/order/store transport failures         │
//! │  └── EngineError      - What callers of the engine see                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → Caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (name, available, requested)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations inside the cart. Every
/// one of them is raised BEFORE the cart is mutated, so a caller that
/// receives an error can assume the cart is exactly as it was.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is soft-deleted or disabled for sale.
    #[error("{name} is not available for sale")]
    ProductInactive { name: String },

    /// The requested variant does not belong to the product.
    #[error("Variant {variant_id} not found on product {product_id}")]
    VariantNotFound {
        product_id: String,
        variant_id: String,
    },

    /// The cart has no line for the given product/variant key.
    #[error("Product {0} is not in the cart")]
    LineNotFound(String),

    /// Insufficient stock to satisfy the requested quantity.
    ///
    /// Raised by the advisory check on add/update and by the authoritative
    /// check at finalization.
    #[error("{name}: insufficient stock (available {available}, requested {requested})")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Cart has exceeded maximum allowed distinct items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Manual price adjustments must be zero or positive.
    #[error("Price adjustment cannot be negative")]
    NegativeAdjustment,

    /// Finalization requires at least one line item.
    #[error("Cannot finalize an empty cart")]
    EmptyCart,

    /// Finalization requires a payment method.
    #[error("A payment method must be selected before finalizing")]
    MissingPaymentMethod,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
