//! # Service Ports
//!
//! The engine never talks to a concrete backend. It is handed three
//! object-safe service handles at construction time:
//!
//! - [`CatalogService`] - product lookups, stock reads, stock decrements
//! - [`OrderService`] - order and order-line creation at finalization
//! - [`SnapshotStore`] - durable key/value store for the cart snapshot
//!
//! Production wires these to the SQLite repositories (see
//! [`crate::adapters`]); tests wire them to in-memory fakes. Injection
//! keeps the engine free of process-wide state.

use async_trait::async_trait;
use thiserror::Error;

use vela_core::{BarcodeHit, Order, OrderLine, ProductRecord};

// =============================================================================
// Service Error
// =============================================================================

/// Transport-level failure of a service call.
///
/// The engine treats these uniformly: the operation that triggered the
/// call fails, and the cart is left exactly as it was. The one exception
/// is the stock decrement during commit, which is logged and collected
/// instead of failing the sale.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The referenced entity does not exist on the backend.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The backend is unreachable or returned a failure.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Result type for service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Ports
// =============================================================================

/// Catalog lookups and stock bookkeeping.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetches a product with its variants by id.
    async fn get_product_by_id(&self, id: &str) -> ServiceResult<Option<ProductRecord>>;

    /// Resolves a barcode (base unit or variant) to an active product.
    async fn get_product_by_barcode(&self, code: &str) -> ServiceResult<Option<BarcodeHit>>;

    /// Reads the current stock level of a product.
    async fn get_stock(&self, product_id: &str) -> ServiceResult<i64>;

    /// Decrements stock by a sold quantity. Best-effort from the
    /// finalizer's perspective.
    async fn decrement_stock(&self, product_id: &str, quantity: i64) -> ServiceResult<()>;
}

/// Order record creation.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Creates the order header. Nothing else is written if this fails.
    async fn create_order(&self, order: &Order) -> ServiceResult<()>;

    /// Creates the order's line items.
    async fn create_order_lines(&self, lines: &[OrderLine]) -> ServiceResult<()>;
}

/// Durable local key/value store for the cart snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Reads the value stored under `key`.
    async fn get(&self, key: &str) -> ServiceResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> ServiceResult<()>;

    /// Removes the entry under `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> ServiceResult<()>;
}
