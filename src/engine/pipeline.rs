//! Address → listing → analysis → report pipeline.
//!
//! All I/O happens before the analyzer runs: the property and its
//! comparables are fetched first, then the pure core grades them.

use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::{DealAnalyzer, DealOverrides};
use crate::listing::{AddressQuery, ComparableQuery, ListingProvider};
use crate::llm::Commentator;
use crate::report::format_report;
use crate::types::{Comparable, DealAnalysis, DealError, PropertyInfo, RepairEstimate};

// ---------------------------------------------------------------------------
// Settings and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ComparableSettings {
    pub enabled: bool,
    /// Fraction either side of the subject's list price.
    pub price_band: Decimal,
    pub limit: u32,
}

impl Default for ComparableSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            price_band: dec!(0.25),
            limit: 5,
        }
    }
}

/// Per-request knobs for `analyze_address`.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub overrides: DealOverrides,
    /// `Some(false)` skips the comparables lookup; `None` follows settings.
    pub use_comparables: Option<bool>,
    /// Original user request, passed through to the commentator.
    pub user_query: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub address: String,
    pub property: PropertyInfo,
    /// Estimator output for the property, even when repairs were overridden.
    pub repair_estimate: RepairEstimate,
    pub analysis: DealAnalysis,
    pub report: String,
    pub commentary: Option<String>,
    pub comparables_used: usize,
}

/// Result of a free-text request.
#[derive(Debug, Clone)]
pub enum MessageOutcome {
    Analysis(Box<PipelineReport>),
    Conversation(String),
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct DealPipeline {
    listing: Box<dyn ListingProvider>,
    commentator: Option<Box<dyn Commentator>>,
    analyzer: DealAnalyzer,
    comps: ComparableSettings,
}

impl DealPipeline {
    pub fn new(
        listing: Box<dyn ListingProvider>,
        commentator: Option<Box<dyn Commentator>>,
        analyzer: DealAnalyzer,
        comps: ComparableSettings,
    ) -> Self {
        Self {
            listing,
            commentator,
            analyzer,
            comps,
        }
    }

    pub fn analyzer(&self) -> &DealAnalyzer {
        &self.analyzer
    }

    pub fn has_commentator(&self) -> bool {
        self.commentator.is_some()
    }

    /// Look up a property by address and analyze it.
    pub async fn analyze_address(
        &self,
        address: &str,
        options: &AnalyzeOptions,
    ) -> Result<PipelineReport> {
        let address = address.trim();
        if address.is_empty() {
            return Err(DealError::invalid("address", "must not be empty").into());
        }

        let query = AddressQuery::parse(address);
        let property = self.listing.fetch_property(&query).await?;

        let comparables = if options.use_comparables.unwrap_or(self.comps.enabled) {
            self.comparables_for(&property).await
        } else {
            Vec::new()
        };

        let analysis = self
            .analyzer
            .analyze_with_overrides(&property, &comparables, options.overrides)?;
        let repair_estimate = match &analysis.repair_estimate {
            Some(estimate) => estimate.clone(),
            None => self.analyzer.repairs().estimate(&property),
        };
        let report = format_report(&analysis);

        let commentary = match &self.commentator {
            Some(commentator) => {
                let user_query = options.user_query.as_deref().unwrap_or("");
                match commentator.commentary(&property, &analysis, user_query).await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        warn!(address = %property.address, error = %e, "Commentary unavailable");
                        None
                    }
                }
            }
            None => None,
        };

        info!(
            address = %property.address,
            comparables = comparables.len(),
            rating = %analysis.rating,
            commentary = commentary.is_some(),
            "Pipeline complete"
        );

        Ok(PipelineReport {
            address: address.to_string(),
            property,
            repair_estimate,
            analysis,
            report,
            commentary,
            comparables_used: comparables.len(),
        })
    }

    /// A comps failure degrades to the list-price fallback rather than
    /// failing the analysis.
    async fn comparables_for(&self, property: &PropertyInfo) -> Vec<Comparable> {
        let Some(query) = ComparableQuery::around(property, self.comps.price_band, self.comps.limit)
        else {
            debug!(address = %property.address, "No location or price, skipping comparables");
            return Vec::new();
        };

        match self.listing.fetch_comparables(&query).await {
            Ok(comps) => comps,
            Err(e) => {
                warn!(address = %property.address, error = %e, "Comparables lookup failed");
                Vec::new()
            }
        }
    }

    /// Free-text entry point: analyze the address the message names, or
    /// answer conversationally when it names none.
    ///
    /// Without a commentator the message itself must look like an address
    /// ("Street, City, ST").
    pub async fn handle_message(&self, message: &str) -> Result<MessageOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DealError::invalid("message", "must not be empty").into());
        }

        let address = match &self.commentator {
            Some(commentator) => match commentator.extract_address(message).await? {
                Some(address) => address,
                None => {
                    debug!("No address in message, answering conversationally");
                    return Ok(MessageOutcome::Conversation(commentator.chat(message).await?));
                }
            },
            None if AddressQuery::parse(message).city.is_some() => message.to_string(),
            None => {
                return Err(DealError::Config(
                    "no language model configured; send a full address".to_string(),
                )
                .into())
            }
        };

        info!(address = %address, "Address extracted from message");
        let options = AnalyzeOptions {
            user_query: Some(message.to_string()),
            ..Default::default()
        };
        let report = self.analyze_address(&address, &options).await?;
        Ok(MessageOutcome::Analysis(Box::new(report)))
    }

    /// General conversation, no listing lookup.
    pub async fn chat(&self, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DealError::invalid("message", "must not be empty").into());
        }
        match &self.commentator {
            Some(commentator) => commentator.chat(message).await,
            None => Err(DealError::Config("no language model configured".to_string()).into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
