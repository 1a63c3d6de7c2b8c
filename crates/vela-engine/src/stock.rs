//! # Stock Validator
//!
//! Answers "can quantity Q of product P be placed in the cart right now?"
//! by reading the catalog's current stock and comparing against Q.
//!
//! ## Check-Then-Act
//! This is an optimistic check, not a reservation. Two terminals can both
//! pass the advisory check for the last unit; whichever finalizes second
//! drives the stock negative. The authoritative re-check at finalization
//! narrows the window but does not close it. There is no cross-session
//! locking anywhere in this subsystem.

use serde::Serialize;
use std::sync::Arc;

use crate::service::{CatalogService, ServiceResult};
use vela_core::SaleCart;

/// Result of a single availability check.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCheck {
    /// Whether the requested quantity is covered by current stock.
    pub available: bool,
    /// The stock level the catalog reported.
    pub current_stock: i64,
}

/// One line that failed the authoritative pre-commit check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockShortfall {
    pub product_id: String,
    pub name: String,
    pub available: i64,
    pub requested: i64,
}

/// Stock validation against the catalog service.
#[derive(Clone)]
pub struct StockValidator {
    catalog: Arc<dyn CatalogService>,
}

impl StockValidator {
    /// Creates a new validator over a catalog handle.
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        StockValidator { catalog }
    }

    /// Checks whether `requested` units of a product are available.
    ///
    /// Called with the COMBINED quantity (existing line + requested) on
    /// add, and with the new total on quantity updates.
    pub async fn check_availability(
        &self,
        product_id: &str,
        requested: i64,
    ) -> ServiceResult<StockCheck> {
        let current_stock = self.catalog.get_stock(product_id).await?;
        Ok(StockCheck {
            available: current_stock >= requested,
            current_stock,
        })
    }

    /// Re-checks every line of the cart against current stock.
    ///
    /// This is the authoritative pre-commit pass: each line is checked
    /// individually (awaited one at a time) and every failing line is
    /// reported, not just the first.
    pub async fn check_cart(&self, cart: &SaleCart) -> ServiceResult<Vec<StockShortfall>> {
        let mut shortfalls = Vec::new();

        for item in &cart.items {
            let check = self.check_availability(&item.product_id, item.quantity).await?;
            if !check.available {
                shortfalls.push(StockShortfall {
                    product_id: item.product_id.clone(),
                    name: item.name.clone(),
                    available: check.current_stock,
                    requested: item.quantity,
                });
            }
        }

        Ok(shortfalls)
    }
}
