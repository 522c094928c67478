//! # Sale Transaction Engine
//!
//! Orchestrates one checkout attempt from cart to committed transaction.
//!
//! ## Checkout Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Pipeline                                 │
//! │                                                                         │
//! │  CheckoutRequest                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Reject empty cart, validate request          (no I/O)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. Fetch + snapshot each product                (advisory pre-check)   │
//! │       │   missing        → ProductNotFound                              │
//! │       │   qty > stock    → InsufficientStock                            │
//! │       ▼                                                                 │
//! │  3. Price the cart                               (pure)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ╔═══════════════════ ONE UNIT OF WORK ═══════════════════╗            │
//! │  ║ 4. Insert transaction + items                           ║            │
//! │  ║ 5. Conditional decrement per line  ──lost race?──► ROLL ║            │
//! │  ║ 6. Low-stock alert check per line                  BACK ║            │
//! │  ╚═══════════════════════╤═════════════════════════════════╝            │
//! │                          ▼                                              │
//! │                       COMMIT → Transaction                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pre-check in step 2 closes the common case early with a clear error;
//! the conditional decrement in step 5 is the authoritative guard. If a
//! concurrent sale wins the race between them, the whole unit of work rolls
//! back: no transaction row, no stock change, no alert.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::{
    price_cart, CheckoutRequest, PricingLine, Product, Transaction, TransactionItem,
};
use tally_store::{DecrementOutcome, InventoryRepository, Store, StoreError, TransactionRepository};

use crate::alerts::LowStockMonitor;
use crate::config::BusinessConfig;
use crate::error::{EngineError, EngineResult};

/// The sale transaction engine.
///
/// One instance serves many concurrent callers; each checkout or deduction
/// is an independent unit of work on its own pooled connection. The only
/// serialization point between them is the conditional decrement on the
/// product row.
#[derive(Debug, Clone)]
pub struct SaleEngine<C> {
    store: Store,
    config: C,
}

impl<C> SaleEngine<C> {
    /// Creates a new engine over a store and a business-config source.
    pub fn new(store: Store, config: C) -> Self {
        SaleEngine { store, config }
    }

    /// Returns the underlying store (for read-side collaborators).
    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl<C: BusinessConfig> SaleEngine<C> {
    /// Runs one checkout attempt.
    ///
    /// ## Failure Semantics
    /// - Before the unit of work: no trace is left anywhere.
    /// - Inside the unit of work: full rollback, then the error is returned.
    /// - After commit: the returned `Transaction` is durable and immutable.
    pub async fn checkout(&self, request: CheckoutRequest) -> EngineResult<Transaction> {
        if request.items.is_empty() {
            return Err(EngineError::EmptyCart);
        }
        request.validate()?;

        debug!(
            business_id = %request.business_id,
            lines = request.items.len(),
            "Checkout received"
        );

        // ---------------------------------------------------------------------
        // Validate & snapshot (advisory; the decrement re-checks under lock)
        // ---------------------------------------------------------------------
        let inventory = self.store.inventory();
        let mut snapshots: Vec<(Product, i64)> = Vec::with_capacity(request.items.len());

        for line in &request.items {
            let product = inventory
                .get(&line.product_id, &request.business_id)
                .await?
                .ok_or_else(|| EngineError::ProductNotFound {
                    product_id: line.product_id.clone(),
                })?;

            if !product.can_fill(line.quantity) {
                return Err(EngineError::InsufficientStock {
                    product_id: product.id,
                    requested: line.quantity,
                    available: product.stock,
                });
            }

            snapshots.push((product, line.quantity));
        }

        // ---------------------------------------------------------------------
        // Price
        // ---------------------------------------------------------------------
        let tax_rate = self.config.tax_rate(&request.business_id).await?;

        let pricing_lines: Vec<PricingLine> = snapshots
            .iter()
            .map(|(product, quantity)| PricingLine {
                unit_price: product.price(),
                cost_price: product.cost(),
                quantity: *quantity,
            })
            .collect();

        let summary = price_cart(&pricing_lines, request.discount(), tax_rate);

        // ---------------------------------------------------------------------
        // Build the immutable transaction record
        // ---------------------------------------------------------------------
        let now = Utc::now();
        let transaction_id = Uuid::new_v4().to_string();

        let items: Vec<TransactionItem> = snapshots
            .iter()
            .map(|(product, quantity)| TransactionItem {
                id: Uuid::new_v4().to_string(),
                transaction_id: transaction_id.clone(),
                product_id: product.id.clone(),
                name_snapshot: product.name.clone(),
                unit_price_cents: product.price_cents,
                cost_cents: product.cost_cents,
                quantity: *quantity,
                line_total_cents: product.price().multiply_quantity(*quantity).cents(),
                created_at: now,
            })
            .collect();

        let transaction = Transaction {
            id: transaction_id.clone(),
            business_id: request.business_id.clone(),
            staff_id: request.staff_id.clone(),
            subtotal_cents: summary.subtotal.cents(),
            discount_cents: summary.discount_amount.cents(),
            tax_cents: summary.tax_amount.cents(),
            total_cents: summary.total.cents(),
            profit_cents: summary.profit.cents(),
            payment_method: request.payment_method,
            notes: request.notes.clone(),
            created_at: now,
            items,
        };

        // ---------------------------------------------------------------------
        // Unit of work: persist sale + decrement every line + alert checks.
        // Any failure rolls back the whole thing.
        // ---------------------------------------------------------------------
        let mut tx = self.store.pool().begin().await.map_err(StoreError::from)?;

        TransactionRepository::insert_with_items_on(&mut tx, &transaction).await?;

        for (product, quantity) in &snapshots {
            let outcome = InventoryRepository::try_decrement_on(
                &mut tx,
                &product.id,
                &request.business_id,
                *quantity,
            )
            .await?;

            match outcome {
                DecrementOutcome::Applied { new_stock } => {
                    LowStockMonitor::check_and_raise(
                        &mut tx,
                        &product.id,
                        new_stock,
                        product.low_stock_threshold,
                    )
                    .await?;
                }
                DecrementOutcome::InsufficientStock { available } => {
                    // Lost the race since the pre-check (or the cart holds
                    // the same product twice). Abandon the whole sale.
                    tx.rollback().await.map_err(StoreError::from)?;
                    return Err(EngineError::InsufficientStock {
                        product_id: product.id.clone(),
                        requested: *quantity,
                        available,
                    });
                }
                DecrementOutcome::NotFound => {
                    tx.rollback().await.map_err(StoreError::from)?;
                    return Err(EngineError::ProductNotFound {
                        product_id: product.id.clone(),
                    });
                }
            }
        }

        tx.commit().await.map_err(StoreError::from)?;

        info!(
            transaction_id = %transaction.id,
            business_id = %transaction.business_id,
            total = %transaction.total(),
            profit = %transaction.profit(),
            lines = transaction.items.len(),
            "Checkout committed"
        );

        Ok(transaction)
    }
}
