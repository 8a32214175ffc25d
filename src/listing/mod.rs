//! Listing-data integrations.
//!
//! Defines the `ListingProvider` trait and the query types passed to it.
//! The Realtor (RapidAPI) client is the only production implementation.

pub mod realtor;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{Comparable, PropertyInfo};

/// Abstraction over property-listing services.
///
/// Implementors return `DealError::PropertyNotFound` (wrapped in the
/// `anyhow::Error`) when a lookup has no results, so callers can tell a
/// miss from a transport failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingProvider: Send + Sync {
    /// Look up the subject property.
    async fn fetch_property(&self, query: &AddressQuery) -> Result<PropertyInfo>;

    /// Find comparable listings and recent sales.
    async fn fetch_comparables(&self, query: &ComparableQuery) -> Result<Vec<Comparable>>;

    /// Provider name for logging and identification.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// A free-form address split into the parts listing searches filter on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressQuery {
    pub raw: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl AddressQuery {
    /// Parse "Street, City, ST 12345".
    ///
    /// With two or more comma-separated parts the city is the second to
    /// last; with three or more the state is the first token of the last.
    pub fn parse(address: &str) -> Self {
        let parts: Vec<&str> = address.split(',').map(str::trim).collect();

        let city = if parts.len() >= 2 {
            Some(parts[parts.len() - 2].to_string()).filter(|c| !c.is_empty())
        } else {
            None
        };

        let state = if parts.len() > 2 {
            parts
                .last()
                .and_then(|last| last.split_whitespace().next())
                .map(str::to_string)
        } else {
            None
        };

        Self {
            raw: address.trim().to_string(),
            city,
            state,
        }
    }
}

/// Search window for comparables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparableQuery {
    pub city: String,
    pub state: String,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub limit: u32,
}

impl ComparableQuery {
    /// Comparables in the property's city priced within `band` of its list
    /// price. Returns `None` when location or price is unknown.
    pub fn around(property: &PropertyInfo, band: Decimal, limit: u32) -> Option<Self> {
        let city = property.city.clone()?;
        let state = property.state.clone()?;
        let price = property.list_price.filter(|p| *p > Decimal::ZERO)?;

        let min_price = (price * (Decimal::ONE - band)).max(Decimal::ZERO).floor();
        let max_price = (price * (Decimal::ONE + band)).ceil();

        Some(Self {
            city,
            state,
            min_price,
            max_price,
            limit,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
