//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;

use crate::analysis::grader::GradeConfig;
use crate::analysis::offer::OfferConfig;
use crate::analysis::repair::RepairConfig;
use crate::analysis::valuation::ValuationConfig;
use crate::analysis::AnalysisPolicy;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisSection,
    pub listing: ListingConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[analysis]`: every numeric policy constant. Omitted keys keep the
/// built-in defaults.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AnalysisSection {
    /// Year used to compute property age. Omit to use the current year.
    pub reference_year: Option<i32>,
    pub medium_min_age: Option<i32>,
    pub heavy_min_age: Option<i32>,
    pub light_rate: Option<Decimal>,
    pub medium_rate: Option<Decimal>,
    pub heavy_rate: Option<Decimal>,
    pub arv_fallback_multiplier: Option<Decimal>,
    pub rule_multiplier: Option<Decimal>,
    pub target_profit_fraction: Option<Decimal>,
    pub holding_cost_fraction: Option<Decimal>,
    pub selling_cost_fraction: Option<Decimal>,
    pub good_band: Option<Decimal>,
    pub marginal_band: Option<Decimal>,
    pub require_complete_data: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingConfig {
    pub enabled: bool,
    /// RapidAPI host, e.g. "realty-in-us.p.rapidapi.com".
    pub api_host: String,
    pub api_key_env: String,
    pub comps_limit: u32,
    /// Comparable price window as a fraction either side of list price.
    pub comps_price_band: Decimal,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

impl AnalysisSection {
    /// Build the engine policy, filling gaps from the built-in defaults.
    pub fn to_policy(&self) -> AnalysisPolicy {
        let repair_default = RepairConfig::default();
        let offer_default = OfferConfig::default();
        let grade_default = GradeConfig::default();

        AnalysisPolicy {
            repair: RepairConfig {
                reference_year: self
                    .reference_year
                    .unwrap_or_else(|| chrono::Utc::now().year()),
                medium_min_age: self.medium_min_age.unwrap_or(repair_default.medium_min_age),
                heavy_min_age: self.heavy_min_age.unwrap_or(repair_default.heavy_min_age),
                light_rate: self.light_rate.unwrap_or(repair_default.light_rate),
                medium_rate: self.medium_rate.unwrap_or(repair_default.medium_rate),
                heavy_rate: self.heavy_rate.unwrap_or(repair_default.heavy_rate),
            },
            valuation: ValuationConfig {
                fallback_multiplier: self
                    .arv_fallback_multiplier
                    .unwrap_or(ValuationConfig::default().fallback_multiplier),
            },
            offer: OfferConfig {
                rule_multiplier: self.rule_multiplier.unwrap_or(offer_default.rule_multiplier),
                target_profit_fraction: self
                    .target_profit_fraction
                    .unwrap_or(offer_default.target_profit_fraction),
                holding_cost_fraction: self
                    .holding_cost_fraction
                    .unwrap_or(offer_default.holding_cost_fraction),
            },
            grade: GradeConfig {
                selling_cost_fraction: self
                    .selling_cost_fraction
                    .unwrap_or(grade_default.selling_cost_fraction),
                good_band: self.good_band.unwrap_or(grade_default.good_band),
                marginal_band: self.marginal_band.unwrap_or(grade_default.marginal_band),
            },
            require_complete_data: self.require_complete_data,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
