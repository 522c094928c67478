//! # Stand-alone Stock Adjustment
//!
//! The scanner-driven "deduct N units" path. Bypasses checkout entirely:
//! no pricing, no transaction record, inventory only. Used for stock
//! corrections and shrinkage, not sales.
//!
//! Shares the exact same conditional-decrement primitive and alert monitor
//! as checkout; there is no second stock-mutation code path to diverge.

use tracing::{debug, info};

use tally_core::DeductRequest;
use tally_store::{DecrementOutcome, InventoryRepository, StoreError};

use crate::alerts::LowStockMonitor;
use crate::checkout::SaleEngine;
use crate::error::{EngineError, EngineResult};

impl<C> SaleEngine<C> {
    /// Deducts stock for one product and returns the new stock level.
    ///
    /// ## Pipeline
    /// 1. Validate the request (quantity ≥ 1, ids present)
    /// 2. Fetch the product: missing → `ProductNotFound`
    /// 3. Advisory stock pre-check → `InsufficientStock`
    /// 4. Atomic conditional decrement + alert check, one unit of work
    ///
    /// Like checkout, the decrement is the authoritative guard; the
    /// pre-check only improves the error for the common case.
    pub async fn deduct_stock(&self, request: DeductRequest) -> EngineResult<i64> {
        request.validate()?;

        debug!(
            business_id = %request.business_id,
            product_id = %request.product_id,
            quantity = %request.quantity,
            "Stock deduction received"
        );

        let product = self
            .store()
            .inventory()
            .get(&request.product_id, &request.business_id)
            .await?
            .ok_or_else(|| EngineError::ProductNotFound {
                product_id: request.product_id.clone(),
            })?;

        if !product.can_fill(request.quantity) {
            return Err(EngineError::InsufficientStock {
                product_id: product.id,
                requested: request.quantity,
                available: product.stock,
            });
        }

        // Decrement and alert ride the same unit of work: an alert can never
        // refer to a stock level that was rolled back.
        let mut tx = self.store().pool().begin().await.map_err(StoreError::from)?;

        let outcome = InventoryRepository::try_decrement_on(
            &mut tx,
            &request.product_id,
            &request.business_id,
            request.quantity,
        )
        .await?;

        let new_stock = match outcome {
            DecrementOutcome::Applied { new_stock } => new_stock,
            DecrementOutcome::InsufficientStock { available } => {
                tx.rollback().await.map_err(StoreError::from)?;
                return Err(EngineError::InsufficientStock {
                    product_id: request.product_id.clone(),
                    requested: request.quantity,
                    available,
                });
            }
            DecrementOutcome::NotFound => {
                tx.rollback().await.map_err(StoreError::from)?;
                return Err(EngineError::ProductNotFound {
                    product_id: request.product_id.clone(),
                });
            }
        };

        LowStockMonitor::check_and_raise(
            &mut tx,
            &request.product_id,
            new_stock,
            product.low_stock_threshold,
        )
        .await?;

        tx.commit().await.map_err(StoreError::from)?;

        info!(
            product_id = %request.product_id,
            quantity = %request.quantity,
            new_stock = %new_stock,
            "Stock deducted"
        );

        Ok(new_stock)
    }
}
