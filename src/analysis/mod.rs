//! Deal-evaluation engine: repair estimation, valuation, MAO and grading.
//!
//! Everything in this module is pure and synchronous. Listing lookups and
//! LLM calls happen elsewhere and finish before these functions run.

pub mod grader;
pub mod offer;
pub mod repair;
pub mod valuation;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::{info, warn};

use crate::types::{ArvSource, Comparable, DealAnalysis, DealError, PropertyInfo};
use grader::{DealGrader, GradeConfig};
use offer::{OfferCalculator, OfferConfig};
use repair::{RepairConfig, RepairEstimator};
use valuation::{ValuationConfig, ValuationEstimator};

/// Largest price, ARV or repair figure the analyzer accepts. Keeps every
/// downstream sum and product well inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Round a monetary amount to cents, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Every numeric rule the engine applies, in one immutable bundle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisPolicy {
    pub repair: RepairConfig,
    pub valuation: ValuationConfig,
    pub offer: OfferConfig,
    pub grade: GradeConfig,
    /// Refuse to grade when floor area is unknown or comparables yield no
    /// price, instead of silently degrading.
    pub require_complete_data: bool,
}

/// Caller-supplied figures that bypass estimation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DealOverrides {
    pub arv: Option<Decimal>,
    pub repair_costs: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Wires comparable-based valuation into grading and applies input checks.
///
/// Construct once from a policy; `analyze` is safe to call from any number
/// of concurrent requests.
#[derive(Debug, Clone)]
pub struct DealAnalyzer {
    repairs: RepairEstimator,
    valuation: ValuationEstimator,
    offers: OfferCalculator,
    grader: DealGrader,
    require_complete_data: bool,
}

impl Default for DealAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisPolicy::default())
    }
}

impl DealAnalyzer {
    pub fn new(policy: AnalysisPolicy) -> Self {
        let repairs = RepairEstimator::new(policy.repair);
        let valuation = ValuationEstimator::new(policy.valuation);
        let offers = OfferCalculator::new(policy.offer);
        let grader = DealGrader::new(policy.grade, repairs.clone(), valuation.clone(), offers.clone());
        Self {
            repairs,
            valuation,
            offers,
            grader,
            require_complete_data: policy.require_complete_data,
        }
    }

    pub fn repairs(&self) -> &RepairEstimator {
        &self.repairs
    }

    pub fn valuation(&self) -> &ValuationEstimator {
        &self.valuation
    }

    pub fn offers(&self) -> &OfferCalculator {
        &self.offers
    }

    pub fn grader(&self) -> &DealGrader {
        &self.grader
    }

    /// Analyze a property using its comparables for ARV.
    pub fn analyze(
        &self,
        property: &PropertyInfo,
        comparables: &[Comparable],
    ) -> Result<DealAnalysis, DealError> {
        self.analyze_with_overrides(property, comparables, DealOverrides::default())
    }

    /// Analyze with optional caller-supplied ARV and repair costs.
    ///
    /// ARV resolution order: override, comparables, list-price fallback.
    pub fn analyze_with_overrides(
        &self,
        property: &PropertyInfo,
        comparables: &[Comparable],
        overrides: DealOverrides,
    ) -> Result<DealAnalysis, DealError> {
        self.validate(property, comparables, &overrides)?;

        let arv = match overrides.arv {
            Some(arv) => (arv, ArvSource::Supplied),
            None => self.resolve_arv(property, comparables)?,
        };

        let analysis = self.grader.grade_with_source(property, arv, overrides.repair_costs);

        info!(
            address = %analysis.property_address,
            comparables = comparables.len(),
            rating = %analysis.rating,
            roi = %analysis.roi_percentage,
            "Analysis complete"
        );

        Ok(analysis)
    }

    fn validate(
        &self,
        property: &PropertyInfo,
        comparables: &[Comparable],
        overrides: &DealOverrides,
    ) -> Result<(), DealError> {
        match property.list_price {
            Some(price) => check_amount("list_price", price)?,
            None if self.require_complete_data => {
                return Err(DealError::insufficient("list_price"));
            }
            None => warn!(address = %property.address, "No list price, treating as 0"),
        }

        if overrides.repair_costs.is_none() && property.sqft.unwrap_or(0) == 0 {
            if self.require_complete_data {
                return Err(DealError::insufficient("sqft"));
            }
            warn!(address = %property.address, "No floor area, repair estimate will be 0");
        }

        if let Some(arv) = overrides.arv {
            check_amount("arv", arv)?;
        }
        if let Some(repairs) = overrides.repair_costs {
            check_amount("repair_costs", repairs)?;
        }
        for price in comparables.iter().filter_map(|c| c.list_price) {
            check_amount("comparables.list_price", price)?;
        }

        Ok(())
    }

    fn resolve_arv(
        &self,
        property: &PropertyInfo,
        comparables: &[Comparable],
    ) -> Result<(Decimal, ArvSource), DealError> {
        match self.valuation.try_estimate_arv(comparables) {
            Ok(arv) => Ok((arv, ArvSource::Comparables)),
            Err(err) if self.require_complete_data => Err(err),
            Err(_) => {
                let arv = self.valuation.fallback_arv(property.list_price_or_zero());
                warn!(
                    address = %property.address,
                    comparables = comparables.len(),
                    multiplier = %self.valuation.config().fallback_multiplier,
                    arv = %round_money(arv),
                    "No priced comparables, using list-price ARV fallback"
                );
                Ok((arv, ArvSource::ListPriceFallback))
            }
        }
    }
}

fn check_amount(field: &str, value: Decimal) -> Result<(), DealError> {
    if value < Decimal::ZERO {
        Err(DealError::invalid(field, "must not be negative"))
    } else if value > MAX_AMOUNT {
        Err(DealError::invalid(field, format!("must not exceed {MAX_AMOUNT}")))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
