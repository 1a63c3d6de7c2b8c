//! # Product Repository
//!
//! Database operations for the product catalog the terminal sells from.
//!
//! ## Key Operations
//! - Lookup by id or barcode (base unit or variant barcode)
//! - Stock reads for the advisory and authoritative checks
//! - Delta stock decrements at finalization
//!
//! ## Stock Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: absolute update (clobbers concurrent sales)             │
//! │     UPDATE products SET current_stock = 7 WHERE id = ?             │
//! │                                                                     │
//! │  ✅ CORRECT: delta update                                          │
//! │     UPDATE products SET current_stock = current_stock - 3          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vela_core::{BarcodeHit, Product, ProductRecord, ProductVariant};

const PRODUCT_COLUMNS: &str = "id, sku, barcode, name, description, \
     retail_price_cents, wholesale_price_cents, current_stock, is_active, \
     created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let record = repo.get_record("uuid-here").await?;
/// let stock = repo.get_stock("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product together with its variants.
    pub async fn get_record(&self, id: &str) -> DbResult<Option<ProductRecord>> {
        let Some(product) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let variants = self.variants_for(&product.id).await?;
        Ok(Some(ProductRecord { product, variants }))
    }

    /// Lists the variants of a product.
    pub async fn variants_for(&self, product_id: &str) -> DbResult<Vec<ProductVariant>> {
        let variants = sqlx::query_as::<_, ProductVariant>(
            "SELECT id, product_id, label, barcode, price_adjustment_cents \
             FROM product_variants WHERE product_id = ?1 ORDER BY label",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(variants)
    }

    /// Resolves a barcode to an active product, checking the base unit
    /// barcode first and variant barcodes second.
    ///
    /// ## Returns
    /// * `Ok(Some(BarcodeHit))` - with `variant_id` set when a variant
    ///   barcode matched
    /// * `Ok(None)` - no active product carries this code
    pub async fn get_by_barcode(&self, code: &str) -> DbResult<Option<BarcodeHit>> {
        debug!(code = %code, "Barcode lookup");

        let sql = format!(
            "SELECT {} FROM products WHERE barcode = ?1 AND is_active = 1",
            PRODUCT_COLUMNS
        );
        if let Some(product) = sqlx::query_as::<_, Product>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
        {
            let variants = self.variants_for(&product.id).await?;
            return Ok(Some(BarcodeHit {
                record: ProductRecord { product, variants },
                variant_id: None,
            }));
        }

        let variant = sqlx::query_as::<_, ProductVariant>(
            "SELECT v.id, v.product_id, v.label, v.barcode, v.price_adjustment_cents \
             FROM product_variants v \
             INNER JOIN products p ON p.id = v.product_id \
             WHERE v.barcode = ?1 AND p.is_active = 1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        match variant {
            Some(v) => {
                let record = self
                    .get_record(&v.product_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Product", &v.product_id))?;
                Ok(Some(BarcodeHit {
                    record,
                    variant_id: Some(v.id),
                }))
            }
            None => Ok(None),
        }
    }

    /// Reads the current stock level of a product.
    pub async fn get_stock(&self, id: &str) -> DbResult<i64> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT current_stock FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        stock.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Decrements product stock by a sold quantity (delta update).
    ///
    /// ## Arguments
    /// * `id` - Product ID
    /// * `quantity` - Units sold (positive)
    pub async fn decrement_stock(&self, id: &str, quantity: i64) -> DbResult<()> {
        debug!(id = %id, quantity = %quantity, "Decrementing stock");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET \
                 current_stock = current_stock - ?2, \
                 updated_at = ?3 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE is_active = 1 ORDER BY name LIMIT ?1",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            "INSERT INTO products ( \
                 id, sku, barcode, name, description, \
                 retail_price_cents, wholesale_price_cents, current_stock, is_active, \
                 created_at, updated_at \
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.retail_price_cents)
        .bind(product.wholesale_price_cents)
        .bind(product.current_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a product variant.
    pub async fn insert_variant(&self, variant: &ProductVariant) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO product_variants (id, product_id, label, barcode, price_adjustment_cents) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&variant.id)
        .bind(&variant.product_id)
        .bind(&variant.label)
        .bind(&variant.barcode)
        .bind(variant.price_adjustment_cents)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
