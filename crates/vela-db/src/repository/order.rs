//! # Order Repository
//!
//! Database operations for committed sales.
//!
//! ## Commit Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. insert_order()      → order header (customer, totals, operator)    │
//! │  2. insert_lines()      → one row per cart line (frozen snapshots)     │
//! │  3. (caller) decrement_stock() per line, best-effort                   │
//! │                                                                         │
//! │  Steps 1 and 2 are separate statements, not one transaction; the       │
//! │  finalizer defines the partial-failure behavior.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use vela_core::{Order, OrderLine};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order header.
    pub async fn insert_order(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, total = %order.total_cents, "Inserting order");

        sqlx::query(
            "INSERT INTO orders ( \
                 id, customer_id, customer_name, \
                 subtotal_cents, discount_percent_bps, discount_amount_cents, total_cents, \
                 payment_method, operator_name, note, created_at \
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(&order.customer_name)
        .bind(order.subtotal_cents)
        .bind(order.discount_percent_bps)
        .bind(order.discount_amount_cents)
        .bind(order.total_cents)
        .bind(order.payment_method)
        .bind(&order.operator_name)
        .bind(&order.note)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts the line items of an order.
    ///
    /// ## Snapshot Pattern
    /// Name and unit price are copied onto each row so the sale history
    /// survives later product edits.
    pub async fn insert_lines(&self, lines: &[OrderLine]) -> DbResult<()> {
        for line in lines {
            debug!(order_id = %line.order_id, product_id = %line.product_id, "Inserting order line");

            sqlx::query(
                "INSERT INTO order_lines ( \
                     id, order_id, product_id, variant_id, name_snapshot, \
                     unit_price_cents, quantity, discount_cents, subtotal_cents, created_at \
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .bind(&line.id)
            .bind(&line.order_id)
            .bind(&line.product_id)
            .bind(&line.variant_id)
            .bind(&line.name_snapshot)
            .bind(line.unit_price_cents)
            .bind(line.quantity)
            .bind(line.discount_cents)
            .bind(line.subtotal_cents)
            .bind(line.created_at)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT id, customer_id, customer_name, \
                    subtotal_cents, discount_percent_bps, discount_amount_cents, total_cents, \
                    payment_method, operator_name, note, created_at \
             FROM orders WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all lines for an order.
    pub async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            "SELECT id, order_id, product_id, variant_id, name_snapshot, \
                    unit_price_cents, quantity, discount_cents, subtotal_cents, created_at \
             FROM order_lines WHERE order_id = ?1 ORDER BY created_at",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Counts orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
