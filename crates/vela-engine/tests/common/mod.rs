//! Shared in-memory fakes for engine tests.
//!
//! Each fake records what the engine asked of it and can be flipped into
//! failure modes to exercise the partial-failure paths.

// Not every test binary uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use vela_core::{BarcodeHit, Order, OrderLine, Product, ProductRecord, ProductVariant};
use vela_engine::{
    CatalogService, OrderService, SaleSession, ServiceError, ServiceResult, SnapshotStore,
};

// =============================================================================
// Catalog Fake
// =============================================================================

#[derive(Default)]
pub struct FakeCatalog {
    products: Mutex<HashMap<String, ProductRecord>>,
    fail_reads: AtomicBool,
    fail_decrements: AtomicBool,
    decrements: Mutex<Vec<(String, i64)>>,
}

impl FakeCatalog {
    pub fn insert(&self, record: ProductRecord) {
        self.products
            .lock()
            .unwrap()
            .insert(record.product.id.clone(), record);
    }

    pub fn set_stock(&self, product_id: &str, stock: i64) {
        if let Some(record) = self.products.lock().unwrap().get_mut(product_id) {
            record.product.current_stock = stock;
        }
    }

    pub fn set_active(&self, product_id: &str, active: bool) {
        if let Some(record) = self.products.lock().unwrap().get_mut(product_id) {
            record.product.is_active = active;
        }
    }

    pub fn set_price(&self, product_id: &str, retail: i64, wholesale: i64) {
        if let Some(record) = self.products.lock().unwrap().get_mut(product_id) {
            record.product.retail_price_cents = retail;
            record.product.wholesale_price_cents = wholesale;
        }
    }

    pub fn remove(&self, product_id: &str) {
        self.products.lock().unwrap().remove(product_id);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_decrements(&self, fail: bool) {
        self.fail_decrements.store(fail, Ordering::SeqCst);
    }

    pub fn decrements(&self) -> Vec<(String, i64)> {
        self.decrements.lock().unwrap().clone()
    }

    fn check_reads(&self) -> ServiceResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("catalog offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn get_product_by_id(&self, id: &str) -> ServiceResult<Option<ProductRecord>> {
        self.check_reads()?;
        Ok(self.products.lock().unwrap().get(id).cloned())
    }

    async fn get_product_by_barcode(&self, code: &str) -> ServiceResult<Option<BarcodeHit>> {
        self.check_reads()?;
        let products = self.products.lock().unwrap();
        for record in products.values() {
            if !record.product.is_active {
                continue;
            }
            if record.product.barcode.as_deref() == Some(code) {
                return Ok(Some(BarcodeHit {
                    record: record.clone(),
                    variant_id: None,
                }));
            }
            if let Some(v) = record.variants.iter().find(|v| v.barcode.as_deref() == Some(code)) {
                return Ok(Some(BarcodeHit {
                    record: record.clone(),
                    variant_id: Some(v.id.clone()),
                }));
            }
        }
        Ok(None)
    }

    async fn get_stock(&self, product_id: &str) -> ServiceResult<i64> {
        self.check_reads()?;
        self.products
            .lock()
            .unwrap()
            .get(product_id)
            .map(|r| r.product.current_stock)
            .ok_or_else(|| ServiceError::NotFound {
                entity: "Product".to_string(),
                id: product_id.to_string(),
            })
    }

    async fn decrement_stock(&self, product_id: &str, quantity: i64) -> ServiceResult<()> {
        if self.fail_decrements.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("catalog offline".to_string()));
        }
        self.decrements
            .lock()
            .unwrap()
            .push((product_id.to_string(), quantity));
        if let Some(record) = self.products.lock().unwrap().get_mut(product_id) {
            record.product.current_stock -= quantity;
        }
        Ok(())
    }
}

// =============================================================================
// Orders Fake
// =============================================================================

#[derive(Default)]
pub struct FakeOrders {
    orders: Mutex<Vec<Order>>,
    lines: Mutex<Vec<OrderLine>>,
    fail_orders: AtomicBool,
    fail_lines: AtomicBool,
}

impl FakeOrders {
    pub fn fail_orders(&self, fail: bool) {
        self.fail_orders.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lines(&self, fail: bool) {
        self.fail_lines.store(fail, Ordering::SeqCst);
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<OrderLine> {
        self.lines.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderService for FakeOrders {
    async fn create_order(&self, order: &Order) -> ServiceResult<()> {
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("order service offline".to_string()));
        }
        self.orders.lock().unwrap().push(order.clone());
        Ok(())
    }

    async fn create_order_lines(&self, lines: &[OrderLine]) -> ServiceResult<()> {
        if self.fail_lines.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("order service offline".to_string()));
        }
        self.lines.lock().unwrap().extend_from_slice(lines);
        Ok(())
    }
}

// =============================================================================
// Snapshot Store Fake
// =============================================================================

#[derive(Default)]
pub struct FakeStore {
    entries: Mutex<HashMap<String, String>>,
}

impl FakeStore {
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn set_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl SnapshotStore for FakeStore {
    async fn get(&self, key: &str) -> ServiceResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> ServiceResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> ServiceResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub catalog: Arc<FakeCatalog>,
    pub orders: Arc<FakeOrders>,
    pub store: Arc<FakeStore>,
    pub session: SaleSession,
}

pub fn harness() -> Harness {
    let catalog = Arc::new(FakeCatalog::default());
    let orders = Arc::new(FakeOrders::default());
    let store = Arc::new(FakeStore::default());
    let session = SaleSession::new(catalog.clone(), orders.clone(), store.clone());
    Harness {
        catalog,
        orders,
        store,
        session,
    }
}

/// Rebuilds a session over the same fakes, as if the terminal restarted.
pub fn restart(h: &Harness) -> SaleSession {
    SaleSession::new(h.catalog.clone(), h.orders.clone(), h.store.clone())
}

pub fn record(id: &str, name: &str, retail: i64, wholesale: i64, stock: i64) -> ProductRecord {
    ProductRecord {
        product: Product {
            id: id.to_string(),
            sku: format!("SKU-{}", id),
            barcode: Some(format!("bar-{}", id)),
            name: name.to_string(),
            description: None,
            retail_price_cents: retail,
            wholesale_price_cents: wholesale,
            current_stock: stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        },
        variants: Vec::new(),
    }
}

pub fn with_variant(mut record: ProductRecord, variant_id: &str, label: &str, delta: i64) -> ProductRecord {
    record.variants.push(ProductVariant {
        id: variant_id.to_string(),
        product_id: record.product.id.clone(),
        label: label.to_string(),
        barcode: Some(format!("bar-{}", variant_id)),
        price_adjustment_cents: delta,
    });
    record
}
