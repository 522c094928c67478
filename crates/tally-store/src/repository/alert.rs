//! # Low-Stock Alert Repository
//!
//! Database operations for low-stock alerts.
//!
//! ## At-Most-One-Open Invariant
//! The alert monitor checks for an existing open alert before inserting, and
//! the schema backs it up with a partial unique index on
//! `(product_id) WHERE dismissed = 0`. Dismissed alerts are kept as history;
//! only the open one blocks duplicates.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use tally_core::LowStockAlert;

/// Repository for low-stock alert records.
#[derive(Debug, Clone)]
pub struct AlertRepository {
    pool: SqlitePool,
}

impl AlertRepository {
    /// Creates a new AlertRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AlertRepository { pool }
    }

    /// Finds the open (non-dismissed) alert for a product, if any.
    pub async fn find_open(&self, product_id: &str) -> StoreResult<Option<LowStockAlert>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_open_on(&mut conn, product_id).await
    }

    /// Finds the open alert on an explicit connection (for use inside the
    /// engine's unit of work).
    pub async fn find_open_on(
        conn: &mut SqliteConnection,
        product_id: &str,
    ) -> StoreResult<Option<LowStockAlert>> {
        let alert = sqlx::query_as::<_, LowStockAlert>(
            r#"
            SELECT id, product_id, current_stock, threshold, dismissed, created_at
            FROM low_stock_alerts
            WHERE product_id = ?1 AND dismissed = 0
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(alert)
    }

    /// Inserts a new alert on an explicit connection.
    pub async fn insert_on(conn: &mut SqliteConnection, alert: &LowStockAlert) -> StoreResult<()> {
        debug!(
            product_id = %alert.product_id,
            current_stock = %alert.current_stock,
            threshold = %alert.threshold,
            "Raising low-stock alert"
        );

        sqlx::query(
            r#"
            INSERT INTO low_stock_alerts (
                id, product_id, current_stock, threshold, dismissed, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&alert.id)
        .bind(&alert.product_id)
        .bind(alert.current_stock)
        .bind(alert.threshold)
        .bind(alert.dismissed)
        .bind(alert.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Dismisses an alert (staff acknowledged it from the UI).
    ///
    /// ## Returns
    /// * `Err(StoreError::NotFound)` - No such alert
    pub async fn dismiss(&self, alert_id: &str) -> StoreResult<()> {
        debug!(alert_id = %alert_id, "Dismissing alert");

        let result = sqlx::query(
            r#"
            UPDATE low_stock_alerts
            SET dismissed = 1
            WHERE id = ?1
            "#,
        )
        .bind(alert_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("LowStockAlert", alert_id));
        }

        Ok(())
    }

    /// Counts open alerts for a product. Used by tests to assert the
    /// at-most-one invariant.
    pub async fn open_count(&self, product_id: &str) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM low_stock_alerts WHERE product_id = ?1 AND dismissed = 0",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

/// Generates a new alert ID.
pub fn generate_alert_id() -> String {
    Uuid::new_v4().to_string()
}
