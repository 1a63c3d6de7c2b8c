//! # Sale Finalizer
//!
//! Converts the cart into a committed order plus stock updates.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   Idle ──► Validating ──► Committing ──► Done                          │
//! │              │               │                                          │
//! │              ▼               ▼                                          │
//! │            Failed          Failed                                       │
//! │                                                                         │
//! │  Preconditions (no I/O): non-empty cart, payment method, operator.     │
//! │  Validating: authoritative stock re-check across every line.           │
//! │  Committing, sequential and NOT one atomic transaction:                │
//! │    1. create order header      - abort on failure, nothing written     │
//! │    2. create order lines       - abort on failure, header is left      │
//! │                                  orphaned, cart is NOT cleared         │
//! │    3. decrement stock per line - failures logged + reported as         │
//! │                                  warnings, the sale stays committed    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in here prevents two finalizations of the same cart if the
//! caller double-invokes; the caller disables the trigger while a
//! finalization is in flight.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::service::{CatalogService, OrderService};
use crate::stock::StockValidator;
use vela_core::validation::validate_operator_name;
use vela_core::{CoreError, Order, OrderLine, SaleCart};

/// Phases of a finalization run, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizePhase {
    Idle,
    Validating,
    Committing,
    Done,
    Failed,
}

/// The result of a successful finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeOutcome {
    /// Id of the order that was created.
    pub order_id: String,

    /// Total charged, in cents.
    pub total_cents: i64,

    /// Stock decrements that failed AFTER the sale committed. The sale is
    /// final regardless; these exist so the operator can reconcile stock
    /// by hand instead of the failure disappearing into a log file.
    pub stock_sync_warnings: Vec<String>,
}

/// Runs the commit sequence for one cart.
#[derive(Clone)]
pub struct Finalizer {
    catalog: Arc<dyn CatalogService>,
    orders: Arc<dyn OrderService>,
    stock: StockValidator,
}

impl Finalizer {
    /// Creates a finalizer over the catalog and order services.
    pub fn new(catalog: Arc<dyn CatalogService>, orders: Arc<dyn OrderService>) -> Self {
        let stock = StockValidator::new(catalog.clone());
        Finalizer {
            catalog,
            orders,
            stock,
        }
    }

    /// Validates and commits the given cart.
    ///
    /// The cart itself is not mutated here; on success the caller clears
    /// it and deletes the snapshot, so any failure leaves the operator's
    /// work intact for a retry.
    pub async fn run(&self, cart: &SaleCart, operator_name: &str) -> EngineResult<FinalizeOutcome> {
        let mut phase = FinalizePhase::Idle;
        debug!(phase = ?phase, "Finalize requested");

        // Synchronous preconditions, before any I/O.
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        let Some(payment_method) = cart.payment_method else {
            return Err(CoreError::MissingPaymentMethod.into());
        };
        let operator = validate_operator_name(operator_name).map_err(CoreError::from)?;

        phase = FinalizePhase::Validating;
        debug!(phase = ?phase, lines = cart.item_count(), "Re-checking stock");

        let shortfalls = self.stock.check_cart(cart).await?;
        if !shortfalls.is_empty() {
            phase = FinalizePhase::Failed;
            debug!(phase = ?phase, count = shortfalls.len(), "Stock validation failed");
            return Err(EngineError::StockValidation { shortfalls });
        }

        phase = FinalizePhase::Committing;
        debug!(phase = ?phase, "Creating order records");

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: cart.customer_id.clone(),
            customer_name: cart.customer_name.clone(),
            subtotal_cents: cart.subtotal_cents,
            discount_percent_bps: cart.order_discount_percent_bps,
            discount_amount_cents: cart.order_discount_amount_cents,
            total_cents: cart.total_cents,
            payment_method,
            operator_name: operator,
            note: if cart.note.trim().is_empty() {
                None
            } else {
                Some(cart.note.clone())
            },
            created_at: now,
        };

        // Step 1: order header. On failure nothing has been written.
        self.orders.create_order(&order).await?;

        // Step 2: line items. On failure the header from step 1 is left
        // orphaned; there is no compensating delete.
        let lines: Vec<OrderLine> = cart
            .items
            .iter()
            .map(|item| OrderLine {
                id: Uuid::new_v4().to_string(),
                order_id: order.id.clone(),
                product_id: item.product_id.clone(),
                variant_id: item.variant_id.clone(),
                name_snapshot: item.name.clone(),
                unit_price_cents: item.effective_unit_price_cents(),
                quantity: item.quantity,
                discount_cents: item.discount_amount_cents,
                subtotal_cents: item.subtotal_cents,
                created_at: now,
            })
            .collect();
        self.orders.create_order_lines(&lines).await?;

        // Step 3: best-effort stock decrements. The sale is already
        // committed; failures are reported, never rolled back.
        let mut stock_sync_warnings = Vec::new();
        for item in &cart.items {
            if let Err(e) = self
                .catalog
                .decrement_stock(&item.product_id, item.quantity)
                .await
            {
                warn!(
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    error = %e,
                    "Stock decrement failed after commit"
                );
                stock_sync_warnings.push(format!("{}: stock decrement failed ({})", item.name, e));
            }
        }

        phase = FinalizePhase::Done;
        info!(
            phase = ?phase,
            order_id = %order.id,
            total = order.total_cents,
            lines = lines.len(),
            warnings = stock_sync_warnings.len(),
            "Sale committed"
        );

        Ok(FinalizeOutcome {
            order_id: order.id,
            total_cents: order.total_cents,
            stock_sync_warnings,
        })
    }
}
