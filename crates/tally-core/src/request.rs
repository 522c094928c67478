//! # Request Types
//!
//! Strongly-typed request structs for the two operations the ledger exposes,
//! validated at the boundary before entering the engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (JSON)                                              │
//! │  └── Type validation via serde deserialization                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  └── Structural rules: ids present, quantities ≥ 1                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine + Store                                                │
//! │  ├── Product existence, stock availability                              │
//! │  └── Atomic conditional decrement (the authoritative guard)             │
//! │                                                                         │
//! │  Defense in depth: each layer catches different errors                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::types::{DiscountRate, PaymentMethod};

// =============================================================================
// Line Item
// =============================================================================

/// One requested cart line: which product, how many units.
///
/// Not persisted as-is; the engine validates it and expands it into a
/// `TransactionItem` with frozen price/cost snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub quantity: i64,
}

impl LineItem {
    fn validate(&self) -> ValidationResult<()> {
        if self.product_id.trim().is_empty() {
            return Err(ValidationError::required("product_id"));
        }
        if self.quantity < 1 {
            return Err(ValidationError::not_positive("quantity", self.quantity));
        }
        Ok(())
    }
}

// =============================================================================
// Checkout Request
// =============================================================================

/// A full checkout attempt: one cart, one staff member, one payment.
///
/// `business_id` and `staff_id` come from the session layer, already
/// authenticated; this core does not re-check permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub business_id: String,
    pub staff_id: String,
    pub items: Vec<LineItem>,
    /// Whole-cart discount as a percentage. Out-of-range values are clamped
    /// to [0, 100], never rejected.
    #[serde(default)]
    pub discount_percent: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckoutRequest {
    /// The discount as a clamped rate, ready for the pricing calculator.
    #[inline]
    pub fn discount(&self) -> DiscountRate {
        DiscountRate::from_percent(self.discount_percent)
    }

    /// Validates the structural rules of the request.
    ///
    /// An empty cart is *not* a validation error here; the engine reports it
    /// as its own typed failure so callers can distinguish the two.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.business_id.trim().is_empty() {
            return Err(ValidationError::required("business_id"));
        }
        if self.staff_id.trim().is_empty() {
            return Err(ValidationError::required("staff_id"));
        }
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

// =============================================================================
// Deduct Request
// =============================================================================

/// A stand-alone stock deduction (scan-to-deduct), bypassing checkout.
///
/// Inventory-only: no transaction record is created for a deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductRequest {
    pub business_id: String,
    pub product_id: String,
    pub quantity: i64,
}

impl DeductRequest {
    /// Validates the structural rules of the request.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.business_id.trim().is_empty() {
            return Err(ValidationError::required("business_id"));
        }
        if self.product_id.trim().is_empty() {
            return Err(ValidationError::required("product_id"));
        }
        if self.quantity < 1 {
            return Err(ValidationError::not_positive("quantity", self.quantity));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
