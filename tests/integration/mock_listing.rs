//! Deterministic in-memory collaborators for integration testing.
//!
//! `MockListing` serves a fixed set of properties keyed by street line
//! and records each comparables query it receives. `ScriptedCommentator`
//! answers with canned text.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

use deal_analyzer::listing::{AddressQuery, ComparableQuery, ListingProvider};
use deal_analyzer::llm::Commentator;
use deal_analyzer::types::{Comparable, DealAnalysis, DealError, PropertyInfo};

pub struct MockListing {
    properties: Vec<PropertyInfo>,
    comparables: Vec<Comparable>,
    comps_queries: Arc<Mutex<Vec<ComparableQuery>>>,
    /// If set, comparables lookups fail with this message.
    comps_error: Arc<Mutex<Option<String>>>,
}

impl MockListing {
    pub fn new() -> Self {
        Self {
            properties: Self::default_properties(),
            comparables: Vec::new(),
            comps_queries: Arc::new(Mutex::new(Vec::new())),
            comps_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_comparables(mut self, comparables: Vec<Comparable>) -> Self {
        self.comparables = comparables;
        self
    }

    pub fn fail_comparables(&self, msg: &str) {
        *self.comps_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Shared handle to the recorded comparables queries.
    pub fn comps_queries(&self) -> Arc<Mutex<Vec<ComparableQuery>>> {
        Arc::clone(&self.comps_queries)
    }

    /// Known listings with hand-checked results under the default policy
    /// (reference year 2025).
    fn default_properties() -> Vec<PropertyInfo> {
        vec![
            // Heavy tier: 1500 × 62.50 = 93,750 repairs, fallback ARV 230,000.
            PropertyInfo::new("123 Main St", dec!(200000))
                .with_sqft(1500)
                .with_year_built(1990)
                .with_location("Austin", "TX"),
            // Light tier: 1000 × 12.50 = 12,500 repairs, fallback ARV 69,000.
            PropertyInfo::new("77 Pine Rd", dec!(60000))
                .with_sqft(1000)
                .with_year_built(2020)
                .with_location("Dayton", "OH"),
            // Medium tier, deeply discounted: EXCELLENT against comps.
            PropertyInfo::new("9 Oak Ave", dec!(80000))
                .with_sqft(1200)
                .with_year_built(2005)
                .with_location("Tampa", "FL"),
            // No floor area or year.
            PropertyInfo {
                address: "5 Bare Lot".to_string(),
                city: Some("Reno".to_string()),
                state: Some("NV".to_string()),
                list_price: Some(dec!(50000)),
                ..Default::default()
            },
        ]
    }
}

#[async_trait]
impl ListingProvider for MockListing {
    async fn fetch_property(&self, query: &AddressQuery) -> Result<PropertyInfo> {
        let street = query.raw.split(',').next().unwrap_or("").trim();
        self.properties
            .iter()
            .find(|p| p.address.eq_ignore_ascii_case(street))
            .cloned()
            .ok_or_else(|| DealError::PropertyNotFound(query.raw.clone()).into())
    }

    async fn fetch_comparables(&self, query: &ComparableQuery) -> Result<Vec<Comparable>> {
        self.comps_queries.lock().unwrap().push(query.clone());
        if let Some(err) = self.comps_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        Ok(self.comparables.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Commentator with canned replies. A message of the form
/// `"...: Street, City, ST"` names the address after the colon.
pub struct ScriptedCommentator {
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedCommentator {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Commentator for ScriptedCommentator {
    async fn extract_address(&self, message: &str) -> Result<Option<String>> {
        self.calls.lock().unwrap().push(format!("extract:{message}"));
        Ok(message
            .split_once(':')
            .map(|(_, address)| address.trim().to_string())
            .filter(|a| a.contains(',')))
    }

    async fn commentary(
        &self,
        property: &PropertyInfo,
        analysis: &DealAnalysis,
        _user_query: &str,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(format!("commentary:{}", property.address));
        Ok(format!("{} rates {}.", property.address, analysis.rating))
    }

    async fn chat(&self, message: &str) -> Result<String> {
        self.calls.lock().unwrap().push(format!("chat:{message}"));
        Ok("Focus on the 70% rule.".to_string())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
