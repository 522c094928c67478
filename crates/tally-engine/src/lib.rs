//! # tally-engine: The Transactional Stock-Ledger Engine
//!
//! Given a cart of line items, atomically validate availability, compute
//! pricing/discount/tax/profit, decrement inventory, and raise low-stock
//! alerts - while tolerating concurrent sales against the same product.
//!
//! ## The Two Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  checkout(CheckoutRequest) ──► Transaction                              │
//! │      validate → snapshot → price → [persist + decrement + alert]        │
//! │                                     └────── one unit of work ───┘       │
//! │                                                                         │
//! │  deduct_stock(DeductRequest) ──► new stock level                        │
//! │      validate → [decrement + alert]     (no Transaction record)         │
//! │                                                                         │
//! │  Both funnel every stock mutation through the same atomic conditional   │
//! │  decrement: stock never goes negative, the last unit is sold once.      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - **No negative stock**: the conditional decrement is the sole
//!   serialization point for the product row; read-then-write is forbidden.
//! - **All-or-nothing checkout**: the transaction record, every line's
//!   decrement, and any alerts commit together or not at all.
//! - **At most one open alert per product**, enforced twice (monitor check
//!   plus partial unique index).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::TaxRate;
//! use tally_engine::{FixedTaxRate, SaleEngine};
//! use tally_store::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("tally.db")).await?;
//! let engine = SaleEngine::new(store, FixedTaxRate(TaxRate::from_bps(500)));
//!
//! let transaction = engine.checkout(request).await?;
//! ```
//!
//! Transport binding (HTTP, bot, whatever) lives outside this workspace;
//! the engine's typed requests and errors are the whole surface.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adjustment;
pub mod alerts;
pub mod checkout;
pub mod config;
pub mod error;

// =============================================================================
// Re-exports
// =============================================================================

pub use alerts::LowStockMonitor;
pub use checkout::SaleEngine;
pub use config::{BusinessConfig, FixedTaxRate};
pub use error::{EngineError, EngineResult};
