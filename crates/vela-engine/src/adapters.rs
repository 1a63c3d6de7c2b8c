//! # SQLite Service Adapters
//!
//! Implements the engine's service ports over the vela-db repositories,
//! so a terminal running against the local SQLite catalog wires up with
//! one call:
//!
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("./vela.db")).await?;
//! let session = adapters::session_from_database(&db);
//! session.recover().await;
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::service::{CatalogService, OrderService, ServiceError, ServiceResult, SnapshotStore};
use crate::session::SaleSession;
use vela_core::{BarcodeHit, Order, OrderLine, ProductRecord};
use vela_db::{Database, DbError};

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            other => ServiceError::Unavailable(other.to_string()),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Catalog service over the local SQLite product repository.
#[derive(Clone)]
pub struct SqliteCatalog {
    db: Database,
}

impl SqliteCatalog {
    pub fn new(db: Database) -> Self {
        SqliteCatalog { db }
    }
}

#[async_trait]
impl CatalogService for SqliteCatalog {
    async fn get_product_by_id(&self, id: &str) -> ServiceResult<Option<ProductRecord>> {
        Ok(self.db.products().get_record(id).await?)
    }

    async fn get_product_by_barcode(&self, code: &str) -> ServiceResult<Option<BarcodeHit>> {
        Ok(self.db.products().get_by_barcode(code).await?)
    }

    async fn get_stock(&self, product_id: &str) -> ServiceResult<i64> {
        Ok(self.db.products().get_stock(product_id).await?)
    }

    async fn decrement_stock(&self, product_id: &str, quantity: i64) -> ServiceResult<()> {
        Ok(self.db.products().decrement_stock(product_id, quantity).await?)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Order service over the local SQLite order repository.
#[derive(Clone)]
pub struct SqliteOrders {
    db: Database,
}

impl SqliteOrders {
    pub fn new(db: Database) -> Self {
        SqliteOrders { db }
    }
}

#[async_trait]
impl OrderService for SqliteOrders {
    async fn create_order(&self, order: &Order) -> ServiceResult<()> {
        Ok(self.db.orders().insert_order(order).await?)
    }

    async fn create_order_lines(&self, lines: &[OrderLine]) -> ServiceResult<()> {
        Ok(self.db.orders().insert_lines(lines).await?)
    }
}

// =============================================================================
// Snapshot Store
// =============================================================================

/// Snapshot store over the local SQLite key/value repository.
#[derive(Clone)]
pub struct SqliteSnapshots {
    db: Database,
}

impl SqliteSnapshots {
    pub fn new(db: Database) -> Self {
        SqliteSnapshots { db }
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshots {
    async fn get(&self, key: &str) -> ServiceResult<Option<String>> {
        Ok(self.db.kv().get(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> ServiceResult<()> {
        Ok(self.db.kv().set(key, value).await?)
    }

    async fn remove(&self, key: &str) -> ServiceResult<()> {
        Ok(self.db.kv().remove(key).await?)
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// Builds a sale session wired to the given database handle.
pub fn session_from_database(db: &Database) -> SaleSession {
    SaleSession::new(
        Arc::new(SqliteCatalog::new(db.clone())),
        Arc::new(SqliteOrders::new(db.clone())),
        Arc::new(SqliteSnapshots::new(db.clone())),
    )
}
