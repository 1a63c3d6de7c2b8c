//! # Persistence & Recovery Manager
//!
//! Makes the in-progress cart survive an unexpected reload without ever
//! trusting stale prices.
//!
//! ## Recovery Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Start Recovery                               │
//! │                                                                         │
//! │  read snapshot key                                                     │
//! │       │                                                                 │
//! │       ├── absent ───────────────────────────► nothing to restore       │
//! │       ├── malformed ──► discard key ────────► nothing to restore       │
//! │       ▼                                                                 │
//! │  for each persisted line:                                              │
//! │       refetch product by id                                            │
//! │       ├── fetch error ──────────────────────► abort, empty cart        │
//! │       ├── missing / inactive / no stock ────► drop the line            │
//! │       ├── quantity > stock ─────────────────► clamp down to stock      │
//! │       ▼                                                                 │
//! │       re-resolve price, reapply adjustment + discount                  │
//! │       (same cart operations as live edits)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  zero lines survived? ──► discard key ──────► nothing to restore       │
//! │  otherwise ─────────────────────────────────► restored cart + notice   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Recovery replays the persisted intent through the SAME `SaleCart`
//! operations used by live edits, so the two paths cannot diverge in
//! rounding or clamp behavior.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::service::{CatalogService, SnapshotStore};
use vela_core::{CartSnapshot, SaleCart, SnapshotLine, CART_SNAPSHOT_KEY};

/// Writes and replays the durable cart snapshot.
#[derive(Clone)]
pub struct PersistenceManager {
    store: Arc<dyn SnapshotStore>,
    catalog: Arc<dyn CatalogService>,
}

impl PersistenceManager {
    /// Creates a new manager over a snapshot store and a catalog handle.
    pub fn new(store: Arc<dyn SnapshotStore>, catalog: Arc<dyn CatalogService>) -> Self {
        PersistenceManager { store, catalog }
    }

    /// Persists the cart's intent, or deletes the snapshot when the cart
    /// carries nothing meaningful.
    ///
    /// Persistence is best-effort: the mutation that triggered it has
    /// already succeeded, so a store failure is logged and swallowed
    /// rather than unwinding the cart.
    pub async fn save(&self, cart: &SaleCart) {
        if !cart.has_meaningful_state() {
            self.delete().await;
            return;
        }

        let snapshot = CartSnapshot::capture(cart);
        let payload = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart snapshot");
                return;
            }
        };

        if let Err(e) = self.store.set(CART_SNAPSHOT_KEY, &payload).await {
            warn!(error = %e, "Failed to persist cart snapshot");
        }
    }

    /// Deletes the persisted snapshot.
    pub async fn delete(&self) {
        if let Err(e) = self.store.remove(CART_SNAPSHOT_KEY).await {
            warn!(error = %e, "Failed to delete cart snapshot");
        }
    }

    /// Checks whether a snapshot is currently stored.
    pub async fn has_snapshot(&self) -> bool {
        matches!(self.store.get(CART_SNAPSHOT_KEY).await, Ok(Some(_)))
    }

    /// Attempts to rebuild a cart from the snapshot plus fresh catalog data.
    ///
    /// Best-effort and non-fatal: any fetch error aborts recovery and
    /// yields `None` rather than propagating. A malformed payload and a
    /// snapshot with zero surviving lines both discard the stored key.
    pub async fn recover(&self) -> Option<SaleCart> {
        let raw = match self.store.get(CART_SNAPSHOT_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Snapshot read failed, skipping recovery");
                return None;
            }
        };

        let snapshot: CartSnapshot = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                // Corrupt payloads are treated as absence, never surfaced.
                warn!(error = %e, "Discarding malformed cart snapshot");
                self.delete().await;
                return None;
            }
        };

        let mut cart = SaleCart::new();
        for line in &snapshot.lines {
            match self.replay_line(&mut cart, line).await {
                Ok(()) => {}
                Err(RecoveryAbort) => {
                    warn!("Catalog unavailable during recovery, starting empty");
                    return None;
                }
            }
        }

        if cart.is_empty() {
            debug!("No snapshot lines survived recovery");
            self.delete().await;
            return None;
        }

        cart.apply_order_discount(snapshot.order_discount);
        cart.set_note(snapshot.note.clone());
        cart.set_payment_method(snapshot.payment_method);

        info!(
            lines = cart.item_count(),
            total = cart.total_cents,
            "Cart restored from snapshot"
        );
        Some(cart)
    }

    /// Replays one persisted line into the cart.
    ///
    /// Lines whose product is missing, inactive or out of stock are
    /// dropped silently; only a transport failure aborts recovery.
    async fn replay_line(&self, cart: &mut SaleCart, line: &SnapshotLine) -> Result<(), RecoveryAbort> {
        let record = match self.catalog.get_product_by_id(&line.product_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(product_id = %line.product_id, "Dropping line: product missing");
                return Ok(());
            }
            Err(_) => return Err(RecoveryAbort),
        };

        if !record.product.is_active {
            debug!(product_id = %line.product_id, "Dropping line: product inactive");
            return Ok(());
        }

        let stock = record.product.current_stock;
        if stock <= 0 {
            debug!(product_id = %line.product_id, "Dropping line: out of stock");
            return Ok(());
        }

        // Clamp the persisted quantity down to what is available now.
        let quantity = line.quantity.min(stock);
        if quantity <= 0 {
            return Ok(());
        }

        if cart
            .add_line(&record, line.variant_id.as_deref(), quantity, stock)
            .is_err()
        {
            // Variant vanished or the product changed shape underneath the
            // snapshot; the line no longer describes anything sellable.
            debug!(product_id = %line.product_id, "Dropping line: replay rejected");
            return Ok(());
        }

        if let Some(flat) = line.manual_adjustment_cents {
            if let Err(e) = cart.apply_manual_adjustment(&line.product_id, line.variant_id.as_deref(), flat)
            {
                debug!(product_id = %line.product_id, error = %e, "Dropping persisted adjustment");
            }
        }

        if cart
            .apply_line_discount(&line.product_id, line.variant_id.as_deref(), line.discount)
            .is_err()
        {
            debug!(product_id = %line.product_id, "Dropping persisted discount");
        }

        Ok(())
    }
}

/// Marker for a transport failure that aborts the whole recovery.
struct RecoveryAbort;
