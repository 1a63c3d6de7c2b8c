//! # vela-db: Database Layer for Vela POS
//!
//! This crate provides database access for the Vela POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vela POS Data Flow                               │
//! │                                                                         │
//! │  vela-engine (sale session, recovery, finalizer)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vela-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepo     │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ CustomerRepo  │    │              │  │   │
//! │  │   │ Management    │    │ KvRepo        │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL mode, local file)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, order, kv, customer)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vela_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/vela.db")).await?;
//!
//! let record = db.products().get_record("uuid-here").await?;
//! let snapshot = db.kv().get("vela.pos.cart").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::kv::KvRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
