//! # Validation Module
//!
//! Input validation utilities for cart operations and finalization.
//! These run BEFORE any business logic or service call, so bad input is
//! rejected synchronously with the cart untouched.

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## Example
/// ```rust
/// use vela_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(1000).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a manual price adjustment in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
pub fn validate_adjustment_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price adjustment".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates the operator/salesperson name given to the finalizer.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_operator_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "operator name".to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "operator name".to_string(),
            max: 100,
        });
    }

    Ok(name.to_string())
}

/// Validates a sale note.
///
/// ## Rules
/// - Can be empty
/// - Maximum 500 characters
pub fn validate_note(note: &str) -> ValidationResult<()> {
    if note.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: 500,
        });
    }

    Ok(())
}

/// Validates a barcode before a catalog lookup.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Maximum 64 characters
///
/// ## Returns
/// The trimmed code.
pub fn validate_barcode(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if code.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 64,
        });
    }

    Ok(code.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
