//! # Business Configuration Boundary
//!
//! The engine consumes the per-business tax rate from a collaborator it does
//! not own (the business-settings layer). This module defines that boundary
//! as a trait so embedders plug in their own source and tests stay pure.

use tally_core::TaxRate;
use tally_store::StoreResult;

/// Supplies per-business configuration the engine needs at checkout time.
///
/// Implementations may hit a settings table, a cache, or a remote service;
/// the engine only awaits the answer. Lookup failures surface as persistence
/// errors to the caller.
pub trait BusinessConfig: Send + Sync {
    /// Returns the configured tax rate for a business.
    fn tax_rate(
        &self,
        business_id: &str,
    ) -> impl std::future::Future<Output = StoreResult<TaxRate>> + Send;
}

/// A constant tax rate for every business.
///
/// Useful for tests and for single-tenant embedders whose tax rate lives in
/// static configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedTaxRate(pub TaxRate);

impl BusinessConfig for FixedTaxRate {
    async fn tax_rate(&self, _business_id: &str) -> StoreResult<TaxRate> {
        Ok(self.0)
    }
}
