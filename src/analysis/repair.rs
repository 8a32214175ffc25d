//! Repair-cost estimation.
//!
//! Classifies renovation scope from property age and prices it per
//! square foot. The breakdown always carries all three tiers so callers
//! can compare scopes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::round_money;
use crate::types::{PropertyInfo, RepairBreakdown, RepairEstimate, RepairTier};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Repair pricing policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairConfig {
    /// Year against which property age is measured.
    pub reference_year: i32,
    /// Age (years) at which scope moves from light to medium.
    pub medium_min_age: i32,
    /// Age (years) at which scope moves from medium to heavy.
    pub heavy_min_age: i32,
    pub light_rate: Decimal,
    pub medium_rate: Decimal,
    pub heavy_rate: Decimal,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            reference_year: 2025,
            medium_min_age: 10,
            heavy_min_age: 30,
            light_rate: dec!(12.50),  // cosmetic: paint, fixtures
            medium_rate: dec!(30.00), // kitchen/bath, flooring
            heavy_rate: dec!(62.50),  // systems, roof, structure
        }
    }
}

impl RepairConfig {
    /// Per-square-foot rate for a tier.
    pub fn rate_for(&self, tier: RepairTier) -> Decimal {
        match tier {
            RepairTier::Light => self.light_rate,
            RepairTier::Medium => self.medium_rate,
            RepairTier::Heavy => self.heavy_rate,
        }
    }

    /// Tier for a property of the given age.
    pub fn tier_for_age(&self, age: i32) -> RepairTier {
        if age < self.medium_min_age {
            RepairTier::Light
        } else if age < self.heavy_min_age {
            RepairTier::Medium
        } else {
            RepairTier::Heavy
        }
    }
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RepairEstimator {
    config: RepairConfig,
}

impl RepairEstimator {
    pub fn new(config: RepairConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RepairConfig {
        &self.config
    }

    /// Estimate repairs from floor area and age.
    ///
    /// A missing construction year counts as age 0 (light scope); a missing
    /// floor area yields a zero estimate.
    pub fn estimate(&self, property: &PropertyInfo) -> RepairEstimate {
        let age = property.age(self.config.reference_year);
        let tier = self.config.tier_for_age(age);
        let rate = self.config.rate_for(tier);
        let sqft = Decimal::from(property.sqft_or_zero());

        let breakdown = RepairBreakdown {
            light: round_money(sqft * self.config.light_rate),
            medium: round_money(sqft * self.config.medium_rate),
            heavy: round_money(sqft * self.config.heavy_rate),
        };
        let estimated_total = round_money(sqft * rate);

        debug!(
            address = %property.address,
            age,
            sqft = %sqft,
            tier = %tier,
            rate = %rate,
            total = %estimated_total,
            "Repairs estimated"
        );

        RepairEstimate {
            tier,
            cost_per_sqft: rate,
            estimated_total,
            breakdown,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
