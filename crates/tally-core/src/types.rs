//! # Domain Types
//!
//! Core domain types for the Tally stock ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  Transaction    │   │ LowStockAlert   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  business_id    │   │  business_id    │   │  product_id     │       │
//! │  │  price_cents    │   │  total_cents    │   │  current_stock  │       │
//! │  │  stock          │   │  profit_cents   │   │  dismissed      │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │ 1..n                                  │
//! │                        ┌────────┴────────┐                              │
//! │                        │ TransactionItem │  frozen price/cost snapshot  │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │    TaxRate      │   │  DiscountRate   │   both in basis points:      │
//! │  │  825 = 8.25%    │   │  clamped 0-100% │   1 bps = 0.01%              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `TransactionItem` freezes the product's name, unit price and cost at the
//! moment of sale. Later price edits never rewrite historical transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    ///
    /// Negative or non-finite input is treated as zero; callers hand us
    /// whatever the business-config collaborator stored.
    pub fn from_percent(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return TaxRate(0);
        }
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Computes this rate's share of an amount, rounding half-up to cents.
    #[inline]
    pub fn amount_of(&self, base: Money) -> Money {
        base.fraction_bps(self.0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A whole-cart percentage discount in basis points, clamped to 0-100%.
///
/// ## Clamping, Not Rejecting
/// Out-of-range input (negative, >100%, NaN) is clamped into range rather
/// than rejected, matching the checkout UI it serves. A 150% discount is a
/// 100% discount; a -5% discount is no discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRate(u32);

/// 100% expressed in basis points.
const MAX_DISCOUNT_BPS: u32 = 10_000;

impl DiscountRate {
    /// Creates a discount rate from a percentage, clamping to [0, 100].
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::types::DiscountRate;
    ///
    /// assert_eq!(DiscountRate::from_percent(10.0).bps(), 1000);
    /// assert_eq!(DiscountRate::from_percent(150.0).bps(), 10_000);
    /// assert_eq!(DiscountRate::from_percent(-5.0).bps(), 0);
    /// ```
    pub fn from_percent(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return DiscountRate(0);
        }
        let bps = (pct * 100.0).round() as u32;
        DiscountRate(bps.min(MAX_DISCOUNT_BPS))
    }

    /// Creates a discount rate from basis points, clamping to [0, 10000].
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > MAX_DISCOUNT_BPS {
            DiscountRate(MAX_DISCOUNT_BPS)
        } else {
            DiscountRate(bps)
        }
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// No discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Computes the discount amount for a subtotal, rounding half-up.
    #[inline]
    pub fn amount_of(&self, base: Money) -> Money {
        base.fraction_bps(self.0)
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in a business's inventory.
///
/// ## Invariant
/// `stock` never goes negative as an effect of this engine: the store layer
/// only mutates it through an atomic conditional decrement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business (tenant) this product belongs to.
    pub business_id: String,

    /// Display name, snapshotted onto transaction items at sale time.
    pub name: String,

    /// Sale price in cents.
    pub price_cents: i64,

    /// Cost price in cents (for profit calculations).
    pub cost_cents: i64,

    /// Current stock level. Never negative.
    pub stock: i64,

    /// Stock level at or below which a low-stock alert is raised.
    pub low_stock_threshold: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost price as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Checks whether the current stock can cover a requested quantity.
    ///
    /// Advisory only: the authoritative check is the store's conditional
    /// decrement, which re-evaluates under the write lock.
    #[inline]
    pub fn can_fill(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid for a transaction.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment.
    Card,
    /// Mobile wallet payment.
    Mobile,
    /// Anything else (store credit, barter, ...).
    Other,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed sale, immutable once created.
///
/// ## Invariants
/// - `total_cents = subtotal_cents - discount_cents + tax_cents`
/// - `profit_cents = Σ(unit_price - cost) × quantity - discount_cents`
///
/// Both hold exactly in integer cents; the pricing calculator enforces them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: String,
    pub business_id: String,
    /// Staff member who rang up the sale (supplied by the session layer).
    pub staff_id: String,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub profit_cents: i64,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Line items in cart order. Loaded separately from the row itself.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<TransactionItem>,
}

impl Transaction {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the profit as Money (can be negative).
    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line item in a committed transaction.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit sale price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Unit cost in cents at time of sale (frozen).
    pub cost_cents: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// unit_price × quantity, in cents.
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl TransactionItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Low-Stock Alert
// =============================================================================

/// A standing notification that a product's stock has fallen to or below its
/// configured threshold.
///
/// ## Invariant
/// At most one non-dismissed alert exists per product at any time. The store
/// enforces this with a partial unique index; the monitor additionally checks
/// before inserting so repeated low-stock events are no-ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LowStockAlert {
    pub id: String,
    pub product_id: String,
    /// Stock level observed when the alert was raised (frozen).
    pub current_stock: i64,
    /// Threshold in effect when the alert was raised (frozen).
    pub threshold: i64,
    /// Set by staff from the UI; this engine never dismisses alerts itself.
    pub dismissed: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
