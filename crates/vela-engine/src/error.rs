//! # Engine Error Type
//!
//! Unified error type for sale-session operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Vela POS                               │
//! │                                                                         │
//! │  CoreError (cart rules)  ──┐                                            │
//! │                            ├──► EngineError ──► caller / frontend       │
//! │  ServiceError (transport) ─┘                                            │
//! │                                                                         │
//! │  Every engine operation returns Result; an Err ALWAYS means the cart   │
//! │  was left exactly as it was. The one deliberate exception is the       │
//! │  stock decrement during commit, which never reaches this type at all:  │
//! │  it is logged and reported through FinalizeOutcome.stock_sync_warnings.│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::service::ServiceError;
use crate::stock::StockShortfall;
use vela_core::{CoreError, ValidationError};

/// Errors returned by sale-session operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Business rule violation inside the cart.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The authoritative pre-commit stock check found shortfalls.
    /// One entry per failing line.
    #[error("{}", format_shortfalls(.shortfalls))]
    StockValidation { shortfalls: Vec<StockShortfall> },

    /// A catalog, order or snapshot service call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(CoreError::Validation(err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Itemized, one-line-per-product message for a failed stock validation.
fn format_shortfalls(shortfalls: &[StockShortfall]) -> String {
    shortfalls
        .iter()
        .map(|s| {
            format!(
                "{}: insufficient stock (available {}, requested {})",
                s.name, s.available, s.requested
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Unit Tests
// =============================================================================
