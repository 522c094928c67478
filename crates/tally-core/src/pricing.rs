//! # Pricing & Totals Calculator
//!
//! Pure cart pricing: subtotal, discount, tax, total and profit.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Pricing Pipeline                                  │
//! │                                                                         │
//! │  lines: (unit_price, cost, qty)*                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subtotal        = Σ unit_price × qty          (exact, integer cents)   │
//! │  discount_amount = subtotal × discount%        (rounded half-up)        │
//! │  taxable_amount  = subtotal − discount_amount                           │
//! │  tax_amount      = taxable_amount × tax%       (rounded half-up)        │
//! │  total           = taxable_amount + tax_amount                          │
//! │  raw_profit      = Σ (unit_price − cost) × qty (exact, integer cents)   │
//! │  profit          = raw_profit − discount_amount                         │
//! │                                                                         │
//! │  Rounding happens exactly twice: at the discount and at the tax.        │
//! │  Sums never round, so totals are stable however many lines there are.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Rules
//! - Pure function: no I/O, no clock, no randomness
//! - Never fails: callers pre-validate quantities ≥ 1 and prices ≥ 0
//! - `total = subtotal - discount_amount + tax_amount` holds exactly

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{DiscountRate, TaxRate};

// =============================================================================
// Input / Output Types
// =============================================================================

/// One line of a cart, reduced to the three numbers pricing needs.
///
/// Built by the engine from a product snapshot plus the requested quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingLine {
    /// Sale price per unit at time of sale.
    pub unit_price: Money,
    /// Cost per unit at time of sale.
    pub cost_price: Money,
    /// Units sold. Callers guarantee ≥ 1.
    pub quantity: i64,
}

impl PricingLine {
    /// unit_price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// (unit_price − cost) × quantity. Negative when selling below cost.
    #[inline]
    pub fn line_margin(&self) -> Money {
        (self.unit_price - self.cost_price).multiply_quantity(self.quantity)
    }
}

/// The complete priced breakdown of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSummary {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub taxable_amount: Money,
    pub tax_amount: Money,
    pub total: Money,
    pub raw_profit: Money,
    pub profit: Money,
}

// =============================================================================
// Calculator
// =============================================================================

/// Prices a cart. Pure and infallible.
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::pricing::{price_cart, PricingLine};
/// use tally_core::types::{DiscountRate, TaxRate};
///
/// let lines = [
///     PricingLine { unit_price: Money::from_cents(1000), cost_price: Money::from_cents(600), quantity: 2 },
///     PricingLine { unit_price: Money::from_cents(2000), cost_price: Money::from_cents(1500), quantity: 1 },
/// ];
/// let summary = price_cart(&lines, DiscountRate::from_percent(10.0), TaxRate::from_bps(500));
///
/// assert_eq!(summary.subtotal.cents(), 4000);        // $40.00
/// assert_eq!(summary.discount_amount.cents(), 400);  // $4.00
/// assert_eq!(summary.tax_amount.cents(), 180);       // $1.80
/// assert_eq!(summary.total.cents(), 3780);           // $37.80
/// assert_eq!(summary.profit.cents(), 900);           // $9.00
/// ```
pub fn price_cart(lines: &[PricingLine], discount: DiscountRate, tax_rate: TaxRate) -> PricingSummary {
    let subtotal: Money = lines.iter().map(PricingLine::line_total).sum();
    let raw_profit: Money = lines.iter().map(PricingLine::line_margin).sum();

    let discount_amount = discount.amount_of(subtotal);
    let taxable_amount = subtotal - discount_amount;
    let tax_amount = tax_rate.amount_of(taxable_amount);
    let total = taxable_amount + tax_amount;
    let profit = raw_profit - discount_amount;

    PricingSummary {
        subtotal,
        discount_amount,
        taxable_amount,
        tax_amount,
        total,
        raw_profit,
        profit,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(unit_price: i64, cost: i64, qty: i64) -> PricingLine {
        PricingLine {
            unit_price: Money::from_cents(unit_price),
            cost_price: Money::from_cents(cost),
            quantity: qty,
        }
    }

    /// The worked two-line cart: 2 × $10 (cost $6) + 1 × $20 (cost $15),
    /// 10% discount, 5% tax.
    #[test]
    fn test_two_line_cart_breakdown() {
        let lines = [line(1000, 600, 2), line(2000, 1500, 1)];
        let summary = price_cart(&lines, DiscountRate::from_percent(10.0), TaxRate::from_bps(500));

        assert_eq!(summary.subtotal.cents(), 4000);
        assert_eq!(summary.discount_amount.cents(), 400);
        assert_eq!(summary.taxable_amount.cents(), 3600);
        assert_eq!(summary.tax_amount.cents(), 180);
        assert_eq!(summary.total.cents(), 3780);
        assert_eq!(summary.raw_profit.cents(), 1300);
        assert_eq!(summary.profit.cents(), 900);
    }

    #[test]
    fn test_empty_cart_prices_to_zero() {
        let summary = price_cart(&[], DiscountRate::from_percent(50.0), TaxRate::from_bps(2000));
        assert_eq!(summary.subtotal, Money::zero());
        assert_eq!(summary.total, Money::zero());
        assert_eq!(summary.profit, Money::zero());
    }

    #[test]
    fn test_no_discount_no_tax() {
        let lines = [line(750, 500, 4)];
        let summary = price_cart(&lines, DiscountRate::zero(), TaxRate::zero());

        assert_eq!(summary.subtotal.cents(), 3000);
        assert_eq!(summary.discount_amount.cents(), 0);
        assert_eq!(summary.tax_amount.cents(), 0);
        assert_eq!(summary.total.cents(), 3000);
        assert_eq!(summary.profit.cents(), 1000);
    }

    #[test]
    fn test_full_discount_zeroes_total() {
        let lines = [line(1000, 600, 1)];
        // 150% clamps to 100%
        let summary = price_cart(&lines, DiscountRate::from_percent(150.0), TaxRate::from_bps(500));

        assert_eq!(summary.discount_amount.cents(), 1000);
        assert_eq!(summary.taxable_amount.cents(), 0);
        assert_eq!(summary.tax_amount.cents(), 0);
        assert_eq!(summary.total.cents(), 0);
        // Entire margin is given away, plus nothing more
        assert_eq!(summary.profit.cents(), -600);
    }

    /// total = subtotal - discount + tax must hold exactly,
    /// whatever rounding the two percentage steps performed.
    #[test]
    fn test_total_identity_with_awkward_rates() {
        let lines = [line(333, 100, 3), line(997, 499, 7), line(101, 99, 13)];
        let summary = price_cart(&lines, DiscountRate::from_percent(7.5), TaxRate::from_bps(825));

        assert_eq!(
            summary.total,
            summary.subtotal - summary.discount_amount + summary.tax_amount
        );
        assert_eq!(summary.profit, summary.raw_profit - summary.discount_amount);
    }

    #[test]
    fn test_selling_below_cost_gives_negative_profit() {
        let lines = [line(500, 900, 2)];
        let summary = price_cart(&lines, DiscountRate::zero(), TaxRate::zero());
        assert_eq!(summary.raw_profit.cents(), -800);
        assert_eq!(summary.profit.cents(), -800);
    }

    /// Many small lines must not accumulate rounding drift: the sums are
    /// exact and only the discount/tax steps round.
    #[test]
    fn test_many_lines_no_accumulation_error() {
        let lines: Vec<PricingLine> = (0..100).map(|_| line(33, 21, 1)).collect();
        let summary = price_cart(&lines, DiscountRate::from_percent(10.0), TaxRate::from_bps(500));

        assert_eq!(summary.subtotal.cents(), 3300);
        assert_eq!(summary.discount_amount.cents(), 330);
        assert_eq!(summary.taxable_amount.cents(), 2970);
        // 2970 × 5% = 148.5 → 149 (half-up)
        assert_eq!(summary.tax_amount.cents(), 149);
        assert_eq!(summary.total.cents(), 3119);
    }
}
