//! Deal grading.
//!
//! Turns price, ARV and repairs into total investment, profit, ROI and a
//! discrete rating against the recommended MAO. Comparables are never
//! fetched here: without an explicit ARV the grader uses the list-price
//! fallback.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info};

use super::offer::OfferCalculator;
use super::repair::RepairEstimator;
use super::round_money;
use super::valuation::ValuationEstimator;
use crate::types::{ArvSource, CostBreakdown, DealAnalysis, DealRating, PropertyInfo, RepairLevel};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GradeConfig {
    /// Agent and closing fees at resale, as a fraction of ARV.
    pub selling_cost_fraction: Decimal,
    /// Price up to `MAO × good_band` grades GOOD.
    pub good_band: Decimal,
    /// Price up to `MAO × marginal_band` grades MARGINAL.
    pub marginal_band: Decimal,
}

impl Default for GradeConfig {
    fn default() -> Self {
        Self {
            selling_cost_fraction: dec!(0.08),
            good_band: dec!(1.05),
            marginal_band: dec!(1.15),
        }
    }
}

impl GradeConfig {
    /// Rate an asking price against a MAO. Bands are checked best first.
    pub fn rate(&self, list_price: Decimal, mao: Decimal) -> DealRating {
        if list_price <= mao {
            DealRating::Excellent
        } else if list_price <= mao * self.good_band {
            DealRating::Good
        } else if list_price <= mao * self.marginal_band {
            DealRating::Marginal
        } else {
            DealRating::Poor
        }
    }
}

// ---------------------------------------------------------------------------
// Grader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct DealGrader {
    config: GradeConfig,
    repairs: RepairEstimator,
    valuation: ValuationEstimator,
    offers: OfferCalculator,
}

impl DealGrader {
    pub fn new(
        config: GradeConfig,
        repairs: RepairEstimator,
        valuation: ValuationEstimator,
        offers: OfferCalculator,
    ) -> Self {
        Self {
            config,
            repairs,
            valuation,
            offers,
        }
    }

    pub fn config(&self) -> &GradeConfig {
        &self.config
    }

    /// Grade a property.
    ///
    /// `repair_costs` defaults to the repair estimator's figure and `arv` to
    /// the list-price fallback.
    pub fn grade(
        &self,
        property: &PropertyInfo,
        arv: Option<Decimal>,
        repair_costs: Option<Decimal>,
    ) -> DealAnalysis {
        let arv = match arv {
            Some(value) => (value, ArvSource::Supplied),
            None => (
                self.valuation.fallback_arv(property.list_price_or_zero()),
                ArvSource::ListPriceFallback,
            ),
        };
        self.grade_with_source(property, arv, repair_costs)
    }

    /// Grade with an ARV whose provenance is already known.
    pub(crate) fn grade_with_source(
        &self,
        property: &PropertyInfo,
        (arv, arv_source): (Decimal, ArvSource),
        repair_costs: Option<Decimal>,
    ) -> DealAnalysis {
        let list_price = property.list_price_or_zero();

        let (repair_costs, repair_level, repair_estimate) = match repair_costs {
            Some(costs) => (costs, RepairLevel::UserProvided, None),
            None => {
                let estimate = self.repairs.estimate(property);
                (estimate.estimated_total, estimate.tier.into(), Some(estimate))
            }
        };

        let offer = self.offers.compute_offer(arv, repair_costs);
        let holding_costs = self.offers.holding_costs(arv);
        let selling_costs = arv * self.config.selling_cost_fraction;

        let total_investment = list_price + repair_costs + holding_costs;
        let potential_profit = arv - total_investment;
        let roi = if total_investment > Decimal::ZERO {
            potential_profit / total_investment * dec!(100)
        } else {
            Decimal::ZERO
        };

        let rating = self.config.rate(list_price, offer.recommended_mao);

        debug!(
            address = %property.address,
            total_investment = %total_investment,
            profit = %potential_profit,
            roi = %roi,
            "Deal metrics computed"
        );

        info!(
            address = %property.address,
            list_price = %list_price,
            arv = %round_money(arv),
            arv_source = %arv_source,
            mao = %offer.recommended_mao,
            rating = %rating,
            "Deal graded"
        );

        DealAnalysis {
            property_address: property.address.clone(),
            list_price: round_money(list_price),
            arv: round_money(arv),
            arv_source,
            estimated_repairs: round_money(repair_costs),
            repair_level,
            repair_estimate,
            max_allowable_offer: offer.recommended_mao,
            total_investment: round_money(total_investment),
            potential_profit: round_money(potential_profit),
            roi_percentage: round_money(roi),
            rating,
            recommendation: rating.recommendation().to_string(),
            breakdown: CostBreakdown {
                purchase_price: round_money(list_price),
                repair_costs: round_money(repair_costs),
                holding_costs: round_money(holding_costs),
                selling_costs: round_money(selling_costs),
                total_costs: round_money(total_investment),
                arv: round_money(arv),
                net_profit: round_money(potential_profit),
            },
            offer,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
