//! # Transaction Repository
//!
//! Database operations for committed sales and their line items.
//!
//! ## Snapshot Pattern
//! Product details (name, price, cost) are copied onto each transaction item
//! at insert time. This preserves sale history even if product details
//! change later: reports over last month's sales are immune to today's
//! price edits.
//!
//! ## Write Path
//! A transaction and its items are only ever inserted together, on a
//! connection the engine controls, inside the same database transaction that
//! decrements stock. There is no update or delete: committed sales are
//! immutable.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;
use tally_core::{Transaction, TransactionItem};

/// Repository for sale transaction records.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Inserts a transaction and all of its items on an explicit connection.
    ///
    /// Takes `&mut SqliteConnection` so the engine can make this part of the
    /// checkout unit of work: if a later stock decrement fails, the rollback
    /// removes these rows too.
    pub async fn insert_with_items_on(
        conn: &mut SqliteConnection,
        transaction: &Transaction,
    ) -> StoreResult<()> {
        debug!(
            id = %transaction.id,
            total_cents = %transaction.total_cents,
            items = transaction.items.len(),
            "Inserting transaction"
        );

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, business_id, staff_id,
                subtotal_cents, discount_cents, tax_cents, total_cents, profit_cents,
                payment_method, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.business_id)
        .bind(&transaction.staff_id)
        .bind(transaction.subtotal_cents)
        .bind(transaction.discount_cents)
        .bind(transaction.tax_cents)
        .bind(transaction.total_cents)
        .bind(transaction.profit_cents)
        .bind(transaction.payment_method)
        .bind(&transaction.notes)
        .bind(transaction.created_at)
        .execute(&mut *conn)
        .await?;

        for item in &transaction.items {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    id, transaction_id, product_id,
                    name_snapshot, unit_price_cents, cost_cents,
                    quantity, line_total_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.unit_price_cents)
            .bind(item.cost_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .bind(item.created_at)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Gets a transaction by id with its items attached, scoped to a business.
    pub async fn get_by_id(
        &self,
        id: &str,
        business_id: &str,
    ) -> StoreResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT
                id, business_id, staff_id,
                subtotal_cents, discount_cents, tax_cents, total_cents, profit_cents,
                payment_method, notes, created_at
            FROM transactions
            WHERE id = ?1 AND business_id = ?2
            "#,
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut transaction) = transaction else {
            return Ok(None);
        };

        transaction.items = self.items(id).await?;
        Ok(Some(transaction))
    }

    /// Gets all items for a transaction, in insertion (cart) order.
    pub async fn items(&self, transaction_id: &str) -> StoreResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT
                id, transaction_id, product_id,
                name_snapshot, unit_price_cents, cost_cents,
                quantity, line_total_cents, created_at
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts transactions for a business (for diagnostics and tests).
    pub async fn count(&self, business_id: &str) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE business_id = ?1")
                .bind(business_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Generates a new transaction ID.
pub fn generate_transaction_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new transaction item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}
