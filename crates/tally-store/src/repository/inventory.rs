//! # Inventory Repository
//!
//! Database operations for per-product stock records.
//!
//! ## The Atomic Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Decrement Strategy                             │
//! │                                                                         │
//! │  ❌ WRONG: read-then-write (lost updates, oversells the last unit)     │
//! │     let p = SELECT stock FROM products WHERE id = ?                     │
//! │     if p.stock >= qty { UPDATE products SET stock = p.stock - qty }     │
//! │                                                                         │
//! │  ✅ CORRECT: one conditional statement                                  │
//! │     UPDATE products SET stock = stock - :qty                            │
//! │     WHERE id = :id AND stock >= :qty                                    │
//! │     RETURNING stock                                                     │
//! │                                                                         │
//! │  The check and the write are indivisible inside SQLite's row write.     │
//! │  Two concurrent sales for the last unit: exactly one UPDATE matches,    │
//! │  the other affects zero rows and is reported as insufficient stock.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is the single serialization point for concurrent sales against the
//! same product. Every stock mutation in the workspace goes through
//! [`InventoryRepository::try_decrement_on`]; there is deliberately no other
//! write path.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;
use tally_core::Product;

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// Stock was decremented; `new_stock` is the post-decrement level.
    Applied { new_stock: i64 },
    /// The product exists but `available < requested`; nothing changed.
    InsufficientStock { available: i64 },
    /// No such product in this business; nothing changed.
    NotFound,
}

/// Repository for product inventory operations.
///
/// ## Usage
/// ```rust,ignore
/// let inventory = store.inventory();
/// let product = inventory.get("p-1", "b-1").await?;
/// let outcome = inventory.try_decrement("p-1", "b-1", 3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets a product by id, scoped to a business.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found in this business
    /// * `Ok(None)` - No such product (or it belongs to another business)
    pub async fn get(&self, product_id: &str, business_id: &str) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, business_id, name,
                price_cents, cost_cents,
                stock, low_stock_threshold,
                created_at, updated_at
            FROM products
            WHERE id = ?1 AND business_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// Product creation is owned by the product-management layer; this
    /// primitive exists so that layer (and tests) have a single insert path.
    pub async fn insert(&self, product: &Product) -> StoreResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, business_id, name,
                price_cents, cost_cents,
                stock, low_stock_threshold,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.business_id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.stock)
        .bind(product.low_stock_threshold)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Atomically decrements stock if (and only if) enough is available.
    ///
    /// Pool-level convenience wrapper around [`Self::try_decrement_on`].
    pub async fn try_decrement(
        &self,
        product_id: &str,
        business_id: &str,
        quantity: i64,
    ) -> StoreResult<DecrementOutcome> {
        let mut conn = self.pool.acquire().await?;
        Self::try_decrement_on(&mut conn, product_id, business_id, quantity).await
    }

    /// Atomically decrements stock on an explicit connection.
    ///
    /// Takes `&mut SqliteConnection` so the engine can run it inside the
    /// same transaction that persists the sale, with full rollback if any
    /// line fails.
    ///
    /// ## Atomicity
    /// The availability check and the write are one statement:
    /// `stock = stock - qty WHERE … AND stock >= qty`. A concurrent caller
    /// that lost the race sees zero affected rows, never negative stock.
    pub async fn try_decrement_on(
        conn: &mut SqliteConnection,
        product_id: &str,
        business_id: &str,
        quantity: i64,
    ) -> StoreResult<DecrementOutcome> {
        debug!(product_id = %product_id, quantity = %quantity, "Attempting stock decrement");

        let now = Utc::now();

        let new_stock: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock = stock - ?3, updated_at = ?4
            WHERE id = ?1 AND business_id = ?2 AND stock >= ?3
            RETURNING stock
            "#,
        )
        .bind(product_id)
        .bind(business_id)
        .bind(quantity)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(new_stock) = new_stock {
            debug!(product_id = %product_id, new_stock = %new_stock, "Stock decremented");
            return Ok(DecrementOutcome::Applied { new_stock });
        }

        // Zero rows matched: either the product is missing or the condition
        // failed. Distinguish so callers can report the right error.
        let available: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT stock FROM products
            WHERE id = ?1 AND business_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(business_id)
        .fetch_optional(&mut *conn)
        .await?;

        match available {
            Some(available) => {
                debug!(
                    product_id = %product_id,
                    available = %available,
                    requested = %quantity,
                    "Decrement refused: insufficient stock"
                );
                Ok(DecrementOutcome::InsufficientStock { available })
            }
            None => Ok(DecrementOutcome::NotFound),
        }
    }

    /// Counts products for a business (for diagnostics).
    pub async fn count(&self, business_id: &str) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE business_id = ?1")
                .bind(business_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
