//! Maximum Allowable Offer.
//!
//! Evaluates the 70% rule and a target-profit method side by side; the
//! lower ceiling is the recommendation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::round_money;
use crate::types::OfferCalculation;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OfferConfig {
    /// Fraction of ARV an investor pays before repairs (0.70 = 70% rule).
    pub rule_multiplier: Decimal,
    /// Target profit as a fraction of ARV.
    pub target_profit_fraction: Decimal,
    /// Financing, taxes and insurance while the flip is held, as a fraction
    /// of ARV.
    pub holding_cost_fraction: Decimal,
}

impl Default for OfferConfig {
    fn default() -> Self {
        Self {
            rule_multiplier: dec!(0.70),
            target_profit_fraction: dec!(0.20),
            holding_cost_fraction: dec!(0.02),
        }
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct OfferCalculator {
    config: OfferConfig,
}

impl OfferCalculator {
    pub fn new(config: OfferConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OfferConfig {
        &self.config
    }

    /// Holding costs for a given ARV, unrounded.
    pub fn holding_costs(&self, arv: Decimal) -> Decimal {
        arv * self.config.holding_cost_fraction
    }

    /// MAO at the configured target profit.
    pub fn compute_offer(&self, arv: Decimal, repair_costs: Decimal) -> OfferCalculation {
        self.compute_offer_with_target(arv, repair_costs, self.config.target_profit_fraction)
    }

    /// MAO for an explicit target profit fraction.
    ///
    /// Negative inputs are not rejected; they flow through the arithmetic.
    pub fn compute_offer_with_target(
        &self,
        arv: Decimal,
        repair_costs: Decimal,
        target_profit_fraction: Decimal,
    ) -> OfferCalculation {
        let rule_mao = arv * self.config.rule_multiplier - repair_costs;

        let target_profit = arv * target_profit_fraction;
        let holding_costs = self.holding_costs(arv);
        let profit_mao = arv - repair_costs - target_profit - holding_costs;

        let recommended_mao = rule_mao.min(profit_mao);

        debug!(
            arv = %arv,
            repairs = %repair_costs,
            rule_mao = %rule_mao,
            profit_mao = %profit_mao,
            recommended = %recommended_mao,
            "Offer computed"
        );

        OfferCalculation {
            rule_mao: round_money(rule_mao),
            profit_mao: round_money(profit_mao),
            recommended_mao: round_money(recommended_mao),
            arv: round_money(arv),
            repair_costs: round_money(repair_costs),
            target_profit: round_money(target_profit),
            holding_costs: round_money(holding_costs),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
