//! # tally-store: Database Layer for the Tally Stock Ledger
//!
//! This crate provides database access for the stock ledger.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Ledger Data Flow                                │
//! │                                                                         │
//! │  tally-engine (checkout / deduct_stock)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │     Store     │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ inventory.rs  │    │  (embedded)  │  │   │
//! │  │   │               │    │ transaction.rs│    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ alert.rs      │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                         SQLite database file                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (inventory, transaction, alert)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_store::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("path/to/tally.db")).await?;
//!
//! let outcome = store.inventory().try_decrement("p-1", "b-1", 2).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Store, StoreConfig};

// Repository re-exports for convenience
pub use repository::alert::AlertRepository;
pub use repository::inventory::{DecrementOutcome, InventoryRepository};
pub use repository::transaction::TransactionRepository;
