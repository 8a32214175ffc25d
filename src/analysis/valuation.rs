//! After-Repair-Value estimation.
//!
//! ARV is the mean of the comparables' list prices. When there are no
//! comparables the analyzer can fall back to a flat multiple of the
//! subject's own list price; that fallback is a placeholder, not a market
//! model, and tends to grade near-market listings as POOR.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::types::{Comparable, DealError};

/// Valuation policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationConfig {
    /// ARV as a multiple of list price when nothing better is known.
    pub fallback_multiplier: Decimal,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            fallback_multiplier: dec!(1.15),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValuationEstimator {
    config: ValuationConfig,
}

impl ValuationEstimator {
    pub fn new(config: ValuationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Mean of all present, non-zero list prices.
    ///
    /// Returns 0 when no comparable carries a price. Callers must read 0 as
    /// "insufficient data"; see [`Self::try_estimate_arv`].
    pub fn estimate_arv(&self, comparables: &[Comparable]) -> Decimal {
        let prices: Vec<Decimal> = comparables
            .iter()
            .filter_map(|c| c.list_price)
            .filter(|p| !p.is_zero())
            .collect();

        if prices.is_empty() {
            debug!(comparables = comparables.len(), "No priced comparables");
            return Decimal::ZERO;
        }

        let sum: Decimal = prices.iter().sum();
        let arv = sum / Decimal::from(prices.len());

        debug!(
            comparables = comparables.len(),
            priced = prices.len(),
            arv = %arv,
            "ARV from comparables"
        );

        arv
    }

    /// Like [`Self::estimate_arv`] but reports the no-data case as an error.
    pub fn try_estimate_arv(&self, comparables: &[Comparable]) -> Result<Decimal, DealError> {
        let arv = self.estimate_arv(comparables);
        if arv.is_zero() {
            return Err(DealError::insufficient("comparable list prices"));
        }
        Ok(arv)
    }

    /// Flat list-price multiple used when no comparables are available.
    pub fn fallback_arv(&self, list_price: Decimal) -> Decimal {
        list_price * self.config.fallback_multiplier
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
