//! # vela-engine: The Sale-Cart Engine
//!
//! Holds the in-progress point-of-sale transaction, keeps it consistent
//! with live stock and pricing data, persists it across reloads, and
//! commits it as an order.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Engine Data Flow                                │
//! │                                                                         │
//! │  UI event ──► SaleSession operation                                    │
//! │                   │                                                     │
//! │                   ├──► StockValidator ──► CatalogService (advisory)    │
//! │                   ▼                                                     │
//! │               SaleCart mutation (vela-core, atomic)                    │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │               PersistenceManager ──► SnapshotStore                     │
//! │                                                                         │
//! │  finalize ──► Finalizer                                                │
//! │                   ├──► StockValidator (authoritative, every line)      │
//! │                   ├──► OrderService (order header, then lines)         │
//! │                   └──► CatalogService (best-effort stock decrements)   │
//! │                                                                         │
//! │  session start ──► PersistenceManager.recover()                        │
//! │                   └──► CatalogService (refetch every persisted line)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`] - The engine surface: cart operations + derived state
//! - [`service`] - Injected service ports (catalog, orders, snapshots)
//! - [`stock`] - Advisory and authoritative stock checks
//! - [`persist`] - Snapshot persistence and reload recovery
//! - [`finalize`] - The commit state machine
//! - [`adapters`] - SQLite implementations of the service ports
//! - [`error`] - Engine error type

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adapters;
pub mod error;
pub mod finalize;
pub mod persist;
pub mod service;
pub mod session;
pub mod stock;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{EngineError, EngineResult};
pub use finalize::{FinalizeOutcome, FinalizePhase, Finalizer};
pub use persist::PersistenceManager;
pub use service::{CatalogService, OrderService, ServiceError, ServiceResult, SnapshotStore};
pub use session::SaleSession;
pub use stock::{StockCheck, StockShortfall, StockValidator};
