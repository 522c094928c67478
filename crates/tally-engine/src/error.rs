//! # Engine Error Types
//!
//! The typed failure outcomes of the two operations the ledger exposes.
//!
//! ## Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EmptyCart          - no line items submitted                           │
//! │  ProductNotFound    - referenced product not in this business           │
//! │  InsufficientStock  - requested > available, at pre-check or at the     │
//! │                       atomic-decrement race window                      │
//! │  Validation         - request failed boundary validation               │
//! │  Persistence        - the store failed to commit                        │
//! │                                                                         │
//! │  The engine never partially commits: any failure inside the unit of     │
//! │  work rolls back completely before the error is returned.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers surface the error kind and its structured fields (which product,
//! how much was available) so the UI can render an actionable message; the
//! engine does not format user-facing strings.

use thiserror::Error;

use tally_core::ValidationError;
use tally_store::StoreError;

/// Failure outcomes of checkout and stock deduction.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No line items were submitted.
    #[error("cart is empty")]
    EmptyCart,

    /// The referenced product does not exist in this business.
    #[error("product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Requested quantity exceeds available stock.
    ///
    /// Raised either by the advisory pre-check or by the authoritative
    /// conditional decrement when a concurrent sale won the race.
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// The request failed boundary validation (blank ids, quantity < 1).
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The underlying store failed to commit (connection loss, timeout,
    /// constraint violation). Retryable by the caller; the engine never
    /// retries internally.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
