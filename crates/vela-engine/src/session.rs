//! # Sale Session
//!
//! The engine surface the POS terminal talks to. Holds the canonical
//! in-memory cart and exposes the full operation set: item management,
//! discounts, manual adjustments, customer switching, persistence and
//! finalization.
//!
//! ## Operation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Anatomy of a Session Operation                            │
//! │                                                                         │
//! │  1. validate input                (sync, cart untouched on error)      │
//! │  2. fetch catalog data / stock    (awaited service calls)              │
//! │  3. mutate the cart               (atomic, under the lock)             │
//! │  4. persist the snapshot          (best-effort, after the mutation)    │
//! │  5. return the updated cart view                                       │
//! │                                                                         │
//! │  The lock is never held across an await point. Mutations issued while │
//! │  a prior stock check is still in flight are not queued or coalesced;  │
//! │  the last write wins, and the authoritative check at finalization     │
//! │  catches anything the advisory checks missed.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The cart is wrapped in `Mutex` because UI commands can run
//! concurrently; only one may modify the cart at a time. Reads also take
//! the lock but release it immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::error::EngineResult;
use crate::finalize::{FinalizeOutcome, Finalizer};
use crate::persist::PersistenceManager;
use crate::service::{CatalogService, OrderService, SnapshotStore};
use crate::stock::{StockCheck, StockValidator};
use vela_core::validation::{validate_adjustment_cents, validate_barcode, validate_note, validate_quantity};
use vela_core::{
    pricing, CartTotals, CoreError, Customer, Discount, PaymentMethod, SaleCart,
};

/// The sale-cart engine.
///
/// Construct one per terminal session with injected service handles, call
/// [`SaleSession::recover`] once at startup, then feed it UI events.
pub struct SaleSession {
    cart: Mutex<SaleCart>,
    catalog: Arc<dyn CatalogService>,
    orders: Arc<dyn OrderService>,
    stock: StockValidator,
    persistence: PersistenceManager,
    /// One-time "cart restored" notice, cleared on acknowledgement.
    restored: AtomicBool,
}

impl SaleSession {
    /// Creates a session with an empty cart bound to the walk-in customer.
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        orders: Arc<dyn OrderService>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        SaleSession {
            cart: Mutex::new(SaleCart::new()),
            stock: StockValidator::new(catalog.clone()),
            persistence: PersistenceManager::new(store, catalog.clone()),
            catalog,
            orders,
            restored: AtomicBool::new(false),
        }
    }

    // =========================================================================
    // Lock Helpers
    // =========================================================================

    /// Executes a function with read access to the cart.
    fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SaleCart) -> R,
    {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SaleCart) -> R,
    {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }

    /// Persists the current cart state after a successful mutation.
    async fn persist_current(&self) {
        let cart = self.with_cart(|c| c.clone());
        self.persistence.save(&cart).await;
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    /// Attempts to restore an interrupted session from the snapshot.
    ///
    /// Call once at session start, before any mutation. Returns `true` when
    /// a non-empty cart was restored; the one-time notice can then be
    /// consumed with [`SaleSession::take_restored_notice`]. Never fails:
    /// on any problem the session simply starts empty.
    pub async fn recover(&self) -> bool {
        match self.persistence.recover().await {
            Some(recovered) => {
                self.with_cart_mut(|c| *c = recovered);
                self.restored.store(true, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    /// Consumes the one-time "cart restored" notice.
    pub fn take_restored_notice(&self) -> bool {
        self.restored.swap(false, Ordering::SeqCst)
    }

    // =========================================================================
    // Item Management
    // =========================================================================

    /// Adds a product to the cart.
    ///
    /// ## Behavior
    /// - Inactive products are rejected.
    /// - The advisory stock check runs against the COMBINED quantity
    ///   (already in cart + requested); on shortfall the cart is unchanged
    ///   and the error reports available vs requested.
    /// - Same `(product, variant)` key merges into the existing line.
    pub async fn add_item(
        &self,
        product_id: &str,
        quantity: Option<i64>,
        variant_id: Option<&str>,
    ) -> EngineResult<SaleCart> {
        let quantity = quantity.unwrap_or(1);
        debug!(product_id = %product_id, quantity = %quantity, "add_item");
        validate_quantity(quantity)?;

        let record = self
            .catalog
            .get_product_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        if !record.product.is_active {
            return Err(CoreError::ProductInactive {
                name: record.product.name.clone(),
            }
            .into());
        }
        let variant = match variant_id {
            Some(vid) => Some(
                record
                    .variant(vid)
                    .ok_or_else(|| CoreError::VariantNotFound {
                        product_id: product_id.to_string(),
                        variant_id: vid.to_string(),
                    })?
                    .clone(),
            ),
            None => None,
        };

        let combined = self.with_cart(|c| c.quantity_of(product_id, variant_id)) + quantity;
        let check = self.stock.check_availability(product_id, combined).await?;
        if !check.available {
            return Err(CoreError::InsufficientStock {
                name: pricing::line_display_name(&record.product, variant.as_ref()),
                available: check.current_stock,
                requested: combined,
            }
            .into());
        }

        let view = self.with_cart_mut(|c| {
            c.add_line(&record, variant_id, quantity, check.current_stock)?;
            Ok::<SaleCart, CoreError>(c.clone())
        })?;
        self.persist_current().await;
        Ok(view)
    }

    /// Adds a product resolved by barcode (base unit or variant code).
    pub async fn add_item_by_barcode(
        &self,
        code: &str,
        quantity: Option<i64>,
    ) -> EngineResult<SaleCart> {
        let code = validate_barcode(code)?;
        debug!(code = %code, "add_item_by_barcode");

        let hit = self
            .catalog
            .get_product_by_barcode(&code)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(code.clone()))?;

        let product_id = hit.record.product.id.clone();
        self.add_item(&product_id, quantity, hit.variant_id.as_deref())
            .await
    }

    /// Sets the quantity of a line. Zero or less removes the line.
    ///
    /// Stock is re-validated for the NEW total before the cart changes; a
    /// percentage discount is reapplied to the new gross and a fixed
    /// amount is clamped if the gross shrank.
    pub async fn update_quantity(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: i64,
    ) -> EngineResult<SaleCart> {
        debug!(product_id = %product_id, quantity = %quantity, "update_quantity");

        if quantity <= 0 {
            return self.remove_item(product_id, variant_id).await;
        }
        validate_quantity(quantity)?;

        let name = self
            .with_cart(|c| c.line(product_id, variant_id).map(|l| l.name.clone()))
            .ok_or_else(|| CoreError::LineNotFound(product_id.to_string()))?;

        let check = self.stock.check_availability(product_id, quantity).await?;
        if !check.available {
            return Err(CoreError::InsufficientStock {
                name,
                available: check.current_stock,
                requested: quantity,
            }
            .into());
        }

        let view = self.with_cart_mut(|c| {
            c.set_line_quantity(product_id, variant_id, quantity, check.current_stock)?;
            Ok::<SaleCart, CoreError>(c.clone())
        })?;
        self.persist_current().await;
        Ok(view)
    }

    /// Removes a line from the cart.
    pub async fn remove_item(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> EngineResult<SaleCart> {
        debug!(product_id = %product_id, "remove_item");

        let view = self.with_cart_mut(|c| {
            c.remove_line(product_id, variant_id)?;
            Ok::<SaleCart, CoreError>(c.clone())
        })?;
        self.persist_current().await;
        Ok(view)
    }

    // =========================================================================
    // Discounts & Adjustments
    // =========================================================================

    /// Applies a discount to a line. Percentages clamp to 100%, amounts
    /// clamp to the line's pre-discount subtotal.
    pub async fn apply_line_discount(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
        discount: Discount,
    ) -> EngineResult<SaleCart> {
        debug!(product_id = %product_id, ?discount, "apply_line_discount");

        let view = self.with_cart_mut(|c| {
            c.apply_line_discount(product_id, variant_id, discount)?;
            Ok::<SaleCart, CoreError>(c.clone())
        })?;
        self.persist_current().await;
        Ok(view)
    }

    /// Removes a line's discount, restoring its pre-discount subtotal.
    pub async fn remove_line_discount(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> EngineResult<SaleCart> {
        self.apply_line_discount(product_id, variant_id, Discount::None)
            .await
    }

    /// Applies the order-level discount over the sum of line subtotals.
    pub async fn apply_order_discount(&self, discount: Discount) -> EngineResult<SaleCart> {
        debug!(?discount, "apply_order_discount");

        let view = self.with_cart_mut(|c| {
            c.apply_order_discount(discount);
            c.clone()
        });
        self.persist_current().await;
        Ok(view)
    }

    /// Removes the order-level discount.
    pub async fn remove_order_discount(&self) -> EngineResult<SaleCart> {
        self.apply_order_discount(Discount::None).await
    }

    /// Applies a flat manual adjustment to a line's total, spread evenly
    /// over its units. Negative amounts are rejected.
    pub async fn apply_manual_adjustment(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
        amount_cents: i64,
    ) -> EngineResult<SaleCart> {
        debug!(product_id = %product_id, amount = %amount_cents, "apply_manual_adjustment");
        validate_adjustment_cents(amount_cents)?;

        let view = self.with_cart_mut(|c| {
            c.apply_manual_adjustment(product_id, variant_id, amount_cents)?;
            Ok::<SaleCart, CoreError>(c.clone())
        })?;
        self.persist_current().await;
        Ok(view)
    }

    /// Removes a line's manual adjustment, restoring the resolved price.
    pub async fn remove_manual_adjustment(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> EngineResult<SaleCart> {
        let view = self.with_cart_mut(|c| {
            c.clear_manual_adjustment(product_id, variant_id)?;
            Ok::<SaleCart, CoreError>(c.clone())
        })?;
        self.persist_current().await;
        Ok(view)
    }

    // =========================================================================
    // Customer, Payment, Note
    // =========================================================================

    /// Binds the sale to a customer.
    ///
    /// A same-type change is a plain field merge. A TYPE change re-resolves
    /// every line's unit price against the new column with fresh catalog
    /// fetches; all fetches complete before the first line changes, so a
    /// transport error leaves the cart untouched.
    pub async fn set_customer(&self, customer: Customer) -> EngineResult<SaleCart> {
        debug!(customer_id = %customer.id, customer_type = ?customer.customer_type, "set_customer");

        let type_changed = self.with_cart(|c| c.customer_type != customer.customer_type);
        if !type_changed {
            let view = self.with_cart_mut(|c| {
                c.rebind_customer(&customer);
                c.clone()
            });
            self.persist_current().await;
            return Ok(view);
        }

        let keys: Vec<(String, Option<String>)> = self.with_cart(|c| {
            c.items
                .iter()
                .map(|i| (i.product_id.clone(), i.variant_id.clone()))
                .collect()
        });

        // Fetch everything first; only then mutate.
        let mut new_prices = Vec::with_capacity(keys.len());
        for (product_id, variant_id) in &keys {
            let record = self
                .catalog
                .get_product_by_id(product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(product_id.clone()))?;
            let variant = match variant_id {
                Some(vid) => Some(
                    record
                        .variant(vid)
                        .ok_or_else(|| CoreError::VariantNotFound {
                            product_id: product_id.clone(),
                            variant_id: vid.clone(),
                        })?
                        .clone(),
                ),
                None => None,
            };
            let price =
                pricing::resolve_unit_price(&record.product, variant.as_ref(), customer.customer_type);
            new_prices.push((product_id.clone(), variant_id.clone(), price));
        }

        let view = self.with_cart_mut(|c| {
            c.rebind_customer(&customer);
            for (product_id, variant_id, price) in &new_prices {
                c.reprice_line(product_id, variant_id.as_deref(), *price)?;
            }
            Ok::<SaleCart, CoreError>(c.clone())
        })?;

        info!(customer_id = %view.customer_id, lines = view.item_count(), "Customer switched, lines repriced");
        self.persist_current().await;
        Ok(view)
    }

    /// Sets or clears the payment method.
    pub async fn set_payment_method(&self, method: Option<PaymentMethod>) -> EngineResult<SaleCart> {
        let view = self.with_cart_mut(|c| {
            c.set_payment_method(method);
            c.clone()
        });
        self.persist_current().await;
        Ok(view)
    }

    /// Sets the free-text note.
    pub async fn set_note(&self, note: &str) -> EngineResult<SaleCart> {
        validate_note(note)?;
        let view = self.with_cart_mut(|c| {
            c.set_note(note);
            c.clone()
        });
        self.persist_current().await;
        Ok(view)
    }

    /// Resets to an empty cart and deletes the persisted snapshot.
    pub async fn clear(&self) -> SaleCart {
        debug!("clear cart");
        let view = self.with_cart_mut(|c| {
            c.clear();
            c.clone()
        });
        self.persistence.delete().await;
        view
    }

    // =========================================================================
    // Finalization
    // =========================================================================

    /// Commits the cart as an order.
    ///
    /// On success the cart is cleared and the snapshot deleted. On ANY
    /// failure the cart is left intact so the operator can retry without
    /// re-entering items.
    pub async fn finalize(&self, operator_name: &str) -> EngineResult<FinalizeOutcome> {
        let cart = self.with_cart(|c| c.clone());
        let finalizer = Finalizer::new(self.catalog.clone(), self.orders.clone());
        let outcome = finalizer.run(&cart, operator_name).await?;

        self.with_cart_mut(|c| c.clear());
        self.persistence.delete().await;
        Ok(outcome)
    }

    // =========================================================================
    // Read-Only Derived State
    // =========================================================================

    /// Returns a clone of the current cart.
    pub fn cart(&self) -> SaleCart {
        self.with_cart(|c| c.clone())
    }

    /// Returns the current totals summary.
    pub fn totals(&self) -> CartTotals {
        self.with_cart(|c| CartTotals::from(c))
    }

    /// Number of distinct lines in the cart.
    pub fn item_count(&self) -> usize {
        self.with_cart(|c| c.item_count())
    }

    /// Whether the cart can be handed to the finalizer.
    pub fn ready_to_finalize(&self) -> bool {
        self.with_cart(|c| c.ready_to_finalize())
    }

    /// Whether a snapshot is currently stored.
    pub async fn has_persisted_data(&self) -> bool {
        self.persistence.has_snapshot().await
    }

    /// Runs an ad hoc availability check (exposed for UI hints).
    pub async fn check_availability(
        &self,
        product_id: &str,
        requested: i64,
    ) -> EngineResult<StockCheck> {
        Ok(self.stock.check_availability(product_id, requested).await?)
    }
}
