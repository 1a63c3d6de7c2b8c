//! # Customer Repository
//!
//! Database operations for customers. The walk-in customer is seeded by
//! the initial migration; registered customers are managed by the
//! storefront admin screens.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use vela_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, customer_type FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Inserting customer");

        sqlx::query("INSERT INTO customers (id, name, customer_type) VALUES (?1, ?2, ?3)")
            .bind(&customer.id)
            .bind(&customer.name)
            .bind(customer.customer_type)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vela_core::CustomerType;

    #[tokio::test]
    async fn test_insert_and_get_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        repo.insert(&Customer {
            id: "c1".to_string(),
            name: "Mercado Azul".to_string(),
            customer_type: CustomerType::Wholesale,
        })
        .await
        .unwrap();

        let fetched = repo.get_by_id("c1").await.unwrap().unwrap();
        assert_eq!(fetched.customer_type, CustomerType::Wholesale);
    }
}
