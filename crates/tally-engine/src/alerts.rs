//! # Low-Stock Alert Monitor
//!
//! Evaluates post-decrement stock against the product's threshold and raises
//! at most one open alert per product.
//!
//! ## Contract
//! ```text
//! check_and_raise(product_id, current_stock, threshold):
//!   current_stock >  threshold  → no-op
//!   current_stock <= threshold  → raise alert, unless one is already open
//! ```
//!
//! The comparison is inclusive: stock falling *to* the threshold alerts.
//! Idempotent: repeated calls while an alert is open create nothing new.
//!
//! The monitor runs on the engine's connection, inside the same unit of work
//! as the decrement that triggered it, so an alert can never outlive a
//! rolled-back sale.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, info};

use tally_core::LowStockAlert;
use tally_store::repository::alert::generate_alert_id;
use tally_store::{AlertRepository, StoreResult};

/// The low-stock alert monitor.
///
/// Stateless: all state lives in the alert table. Separate from the
/// decrement path so each is testable on its own.
pub struct LowStockMonitor;

impl LowStockMonitor {
    /// Pure threshold decision, inclusive at the boundary.
    ///
    /// ## Example
    /// ```rust
    /// use tally_engine::alerts::LowStockMonitor;
    ///
    /// assert!(LowStockMonitor::stock_is_low(2, 2));  // at threshold: alert
    /// assert!(LowStockMonitor::stock_is_low(0, 2));
    /// assert!(!LowStockMonitor::stock_is_low(3, 2)); // above: quiet
    /// ```
    #[inline]
    pub fn stock_is_low(current_stock: i64, threshold: i64) -> bool {
        current_stock <= threshold
    }

    /// Checks post-decrement stock and raises an alert if needed.
    ///
    /// ## Returns
    /// * `Ok(Some(alert))` - A new alert was created
    /// * `Ok(None)` - Stock is fine, or an alert is already open
    pub async fn check_and_raise(
        conn: &mut SqliteConnection,
        product_id: &str,
        current_stock: i64,
        threshold: i64,
    ) -> StoreResult<Option<LowStockAlert>> {
        if !Self::stock_is_low(current_stock, threshold) {
            return Ok(None);
        }

        if AlertRepository::find_open_on(conn, product_id).await?.is_some() {
            debug!(product_id = %product_id, "Low stock but alert already open");
            return Ok(None);
        }

        let alert = LowStockAlert {
            id: generate_alert_id(),
            product_id: product_id.to_string(),
            current_stock,
            threshold,
            dismissed: false,
            created_at: Utc::now(),
        };

        AlertRepository::insert_on(conn, &alert).await?;

        info!(
            product_id = %product_id,
            current_stock = %current_stock,
            threshold = %threshold,
            "Low-stock alert raised"
        );

        Ok(Some(alert))
    }
}
