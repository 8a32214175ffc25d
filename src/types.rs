//! Shared types for the deal analyzer.
//!
//! These types form the data model used across all modules. The
//! calculators in `analysis` only read `PropertyInfo`/`Comparable` and
//! produce the derived records below; listing, LLM and API layers
//! depend on them without depending on each other.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Property
// ---------------------------------------------------------------------------

/// A residential property as described by a listing.
///
/// Every attribute other than the address is optional: listing feeds are
/// patchy and the analyzer decides per field how a missing value is treated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PropertyInfo {
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    /// Two-letter state code, e.g. "TX".
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    /// Asking price in USD.
    #[serde(default)]
    pub list_price: Option<Decimal>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    /// Bathrooms (half baths count as 0.5).
    #[serde(default)]
    pub bathrooms: Option<Decimal>,
    /// Interior floor area in square feet.
    #[serde(default)]
    pub sqft: Option<u32>,
    #[serde(default)]
    pub lot_sqft: Option<u64>,
    /// `None` when the listing does not report a construction year.
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub list_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PropertyInfo {
    /// Minimal property with an address and asking price.
    pub fn new(address: impl Into<String>, list_price: Decimal) -> Self {
        Self {
            address: address.into(),
            list_price: Some(list_price),
            ..Default::default()
        }
    }

    pub fn with_sqft(mut self, sqft: u32) -> Self {
        self.sqft = Some(sqft);
        self
    }

    pub fn with_year_built(mut self, year: i32) -> Self {
        self.year_built = Some(year);
        self
    }

    pub fn with_location(mut self, city: &str, state: &str) -> Self {
        self.city = Some(city.to_string());
        self.state = Some(state.to_string());
        self
    }

    /// Asking price, with a missing price treated as zero.
    pub fn list_price_or_zero(&self) -> Decimal {
        self.list_price.unwrap_or(Decimal::ZERO)
    }

    /// Floor area, with a missing area treated as zero (yields a zero
    /// repair estimate).
    pub fn sqft_or_zero(&self) -> u32 {
        self.sqft.unwrap_or(0)
    }

    /// Age in whole years relative to `reference_year`. An unknown
    /// construction year is treated as age 0.
    pub fn age(&self, reference_year: i32) -> i32 {
        self.year_built
            .map(|built| reference_year.saturating_sub(built))
            .unwrap_or(0)
    }

    /// Helper to build a sample property with sensible defaults.
    #[cfg(test)]
    pub fn sample() -> Self {
        Self {
            address: "123 Main St".to_string(),
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            postal_code: Some("78701".to_string()),
            list_price: Some(rust_decimal_macros::dec!(200000)),
            bedrooms: Some(3),
            bathrooms: Some(rust_decimal_macros::dec!(2)),
            sqft: Some(1500),
            lot_sqft: Some(6000),
            year_built: Some(1990),
            property_type: Some("single_family".to_string()),
            status: Some("for_sale".to_string()),
            list_date: None,
            description: None,
        }
    }
}

impl fmt::Display for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        if let (Some(city), Some(state)) = (&self.city, &self.state) {
            write!(f, ", {city}, {state}")?;
        }
        if let Some(price) = self.list_price {
            write!(f, " (${price})")?;
        }
        Ok(())
    }
}

/// A nearby listing or sale used as a valuation reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Comparable {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub list_price: Option<Decimal>,
    #[serde(default)]
    pub sqft: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Comparable {
    pub fn priced(list_price: Decimal) -> Self {
        Self {
            list_price: Some(list_price),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Repairs
// ---------------------------------------------------------------------------

/// Renovation scope derived from property age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairTier {
    Light,
    Medium,
    Heavy,
}

impl RepairTier {
    pub const ALL: &'static [RepairTier] = &[RepairTier::Light, RepairTier::Medium, RepairTier::Heavy];
}

impl fmt::Display for RepairTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairTier::Light => write!(f, "light"),
            RepairTier::Medium => write!(f, "medium"),
            RepairTier::Heavy => write!(f, "heavy"),
        }
    }
}

/// Total repair cost under each tier's rate, for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairBreakdown {
    pub light: Decimal,
    pub medium: Decimal,
    pub heavy: Decimal,
}

impl RepairBreakdown {
    pub fn for_tier(&self, tier: RepairTier) -> Decimal {
        match tier {
            RepairTier::Light => self.light,
            RepairTier::Medium => self.medium,
            RepairTier::Heavy => self.heavy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairEstimate {
    pub tier: RepairTier,
    pub cost_per_sqft: Decimal,
    pub estimated_total: Decimal,
    pub breakdown: RepairBreakdown,
}

/// Repair scope echoed by a deal analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairLevel {
    Light,
    Medium,
    Heavy,
    /// Repair costs came from the caller rather than the estimator.
    UserProvided,
}

impl From<RepairTier> for RepairLevel {
    fn from(tier: RepairTier) -> Self {
        match tier {
            RepairTier::Light => RepairLevel::Light,
            RepairTier::Medium => RepairLevel::Medium,
            RepairTier::Heavy => RepairLevel::Heavy,
        }
    }
}

impl fmt::Display for RepairLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairLevel::Light => write!(f, "light"),
            RepairLevel::Medium => write!(f, "medium"),
            RepairLevel::Heavy => write!(f, "heavy"),
            RepairLevel::UserProvided => write!(f, "user_provided"),
        }
    }
}

// ---------------------------------------------------------------------------
// Offer
// ---------------------------------------------------------------------------

/// Maximum Allowable Offer under both underwriting methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferCalculation {
    /// `arv × rule multiplier − repairs` (the 70% rule).
    pub rule_mao: Decimal,
    /// `arv − repairs − target profit − holding costs`.
    pub profit_mao: Decimal,
    /// The lower of the two.
    pub recommended_mao: Decimal,
    pub arv: Decimal,
    pub repair_costs: Decimal,
    pub target_profit: Decimal,
    pub holding_costs: Decimal,
}

// ---------------------------------------------------------------------------
// Deal analysis
// ---------------------------------------------------------------------------

/// Which valuation path produced the ARV of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArvSource {
    /// Passed in by the caller.
    Supplied,
    /// Mean of comparable list prices.
    Comparables,
    /// Flat multiple of the list price.
    ListPriceFallback,
}

impl fmt::Display for ArvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArvSource::Supplied => write!(f, "supplied"),
            ArvSource::Comparables => write!(f, "comparables"),
            ArvSource::ListPriceFallback => write!(f, "list price fallback"),
        }
    }
}

/// Discrete investment grade, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DealRating {
    Excellent,
    Good,
    Marginal,
    Poor,
}

impl DealRating {
    pub const ALL: &'static [DealRating] = &[
        DealRating::Excellent,
        DealRating::Good,
        DealRating::Marginal,
        DealRating::Poor,
    ];

    pub fn recommendation(&self) -> &'static str {
        match self {
            DealRating::Excellent => "Strong buy — property is below MAO.",
            DealRating::Good => "Negotiate — close to MAO, try to lower price.",
            DealRating::Marginal => "Risky — only proceed if you can negotiate significantly.",
            DealRating::Poor => "Pass — property is overpriced for investment.",
        }
    }
}

impl fmt::Display for DealRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealRating::Excellent => write!(f, "EXCELLENT"),
            DealRating::Good => write!(f, "GOOD"),
            DealRating::Marginal => write!(f, "MARGINAL"),
            DealRating::Poor => write!(f, "POOR"),
        }
    }
}

/// Itemized costs of a flip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub purchase_price: Decimal,
    pub repair_costs: Decimal,
    pub holding_costs: Decimal,
    /// Agent and closing fees at resale. Reported only; not part of
    /// `total_costs`.
    pub selling_costs: Decimal,
    pub total_costs: Decimal,
    pub arv: Decimal,
    pub net_profit: Decimal,
}

/// Complete evaluation of one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealAnalysis {
    pub property_address: String,
    pub list_price: Decimal,
    pub arv: Decimal,
    pub arv_source: ArvSource,
    pub estimated_repairs: Decimal,
    pub repair_level: RepairLevel,
    /// Present when the repair figure came from the estimator.
    pub repair_estimate: Option<RepairEstimate>,
    pub max_allowable_offer: Decimal,
    pub offer: OfferCalculation,
    pub total_investment: Decimal,
    /// May be negative.
    pub potential_profit: Decimal,
    /// May be negative; 0 when nothing is invested.
    pub roi_percentage: Decimal,
    pub rating: DealRating,
    pub recommendation: String,
    pub breakdown: CostBreakdown,
}

impl DealAnalysis {
    /// Whether the asking price is at or below the MAO.
    pub fn is_buy(&self) -> bool {
        self.rating == DealRating::Excellent
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the deal analyzer.
#[derive(Debug, thiserror::Error)]
pub enum DealError {
    #[error("Insufficient data: {field}")]
    InsufficientData { field: String },

    #[error("Invalid input ({field}): {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Listing provider error ({provider}): {message}")]
    Listing { provider: String, message: String },

    #[error("Commentary error ({model}): {message}")]
    Commentary { model: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DealError {
    pub fn insufficient(field: &str) -> Self {
        DealError::InsufficientData {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        DealError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // -- PropertyInfo tests --

    #[test]
    fn test_age_from_year_built() {
        let p = PropertyInfo::new("1 Elm St", dec!(100000)).with_year_built(1990);
        assert_eq!(p.age(2025), 35);
    }

    #[test]
    fn test_unknown_year_is_age_zero() {
        let p = PropertyInfo::new("1 Elm St", dec!(100000));
        assert_eq!(p.age(2025), 0);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let p = PropertyInfo {
            address: "1 Elm St".into(),
            ..Default::default()
        };
        assert_eq!(p.list_price_or_zero(), Decimal::ZERO);
        assert_eq!(p.sqft_or_zero(), 0);
    }

    #[test]
    fn test_property_display() {
        let p = PropertyInfo::new("1 Elm St", dec!(150000)).with_location("Austin", "TX");
        assert_eq!(p.to_string(), "1 Elm St, Austin, TX ($150000)");
    }

    #[test]
    fn test_property_deserializes_with_missing_fields() {
        let p: PropertyInfo =
            serde_json::from_str(r#"{"address": "9 Oak Ave", "list_price": 120000}"#).unwrap();
        assert_eq!(p.list_price, Some(dec!(120000)));
        assert!(p.sqft.is_none());
        assert!(p.year_built.is_none());
    }

    // -- Enum tests --

    #[test]
    fn test_rating_display_and_serde() {
        assert_eq!(DealRating::Excellent.to_string(), "EXCELLENT");
        assert_eq!(serde_json::to_string(&DealRating::Marginal).unwrap(), "\"MARGINAL\"");
        let poor: DealRating = serde_json::from_str("\"POOR\"").unwrap();
        assert_eq!(poor, DealRating::Poor);
    }

    #[test]
    fn test_rating_order_best_first() {
        assert!(DealRating::Excellent < DealRating::Good);
        assert!(DealRating::Good < DealRating::Marginal);
        assert!(DealRating::Marginal < DealRating::Poor);
    }

    #[test]
    fn test_recommendation_text() {
        assert_eq!(
            DealRating::Poor.recommendation(),
            "Pass — property is overpriced for investment."
        );
        assert!(DealRating::Excellent.recommendation().starts_with("Strong buy"));
        for rating in DealRating::ALL {
            let text = rating.recommendation();
            assert!(text.ends_with('.'), "{rating}: {text}");
            assert!(text.contains(" — "), "{rating}: {text}");
        }
    }

    #[test]
    fn test_age_saturates_on_extreme_years() {
        let ancient = PropertyInfo::new("x", dec!(1)).with_year_built(i32::MIN);
        assert_eq!(ancient.age(2025), i32::MAX);
        let far_future = PropertyInfo::new("x", dec!(1)).with_year_built(i32::MAX);
        assert_eq!(far_future.age(-10), i32::MIN);
    }

    #[test]
    fn test_repair_level_from_tier() {
        assert_eq!(RepairLevel::from(RepairTier::Heavy), RepairLevel::Heavy);
        assert_eq!(RepairLevel::UserProvided.to_string(), "user_provided");
        assert_eq!(serde_json::to_string(&RepairTier::Medium).unwrap(), "\"medium\"");
    }

    #[test]
    fn test_breakdown_for_tier() {
        let b = RepairBreakdown {
            light: dec!(1),
            medium: dec!(2),
            heavy: dec!(3),
        };
        assert_eq!(b.for_tier(RepairTier::Medium), dec!(2));
    }

    // -- Error tests --

    #[test]
    fn test_error_display() {
        let e = DealError::insufficient("sqft");
        assert_eq!(e.to_string(), "Insufficient data: sqft");
        let e = DealError::invalid("list_price", "must not be negative");
        assert_eq!(e.to_string(), "Invalid input (list_price): must not be negative");
    }
}
