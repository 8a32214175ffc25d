//! Realtor.com listings via the RapidAPI "realty-in-us" service.
//!
//! Endpoint: `POST https://{host}/properties/v3/list`
//! Auth: `X-RapidAPI-Host` / `X-RapidAPI-Key` headers.
//! Results live under `data.home_search.results`; only the fields needed
//! for deal analysis are deserialized.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{AddressQuery, ComparableQuery, ListingProvider};
use crate::types::{Comparable, DealError, PropertyInfo};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_HOST: &str = "realty-in-us.p.rapidapi.com";
const PROVIDER_NAME: &str = "realtor";

const MAX_RETRIES: u32 = 2;
const BASE_BACKOFF_MS: u64 = 500;

// ---------------------------------------------------------------------------
// API response types (Realtor JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Option<ListData>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(default)]
    home_search: Option<HomeSearch>,
}

#[derive(Debug, Deserialize)]
struct HomeSearch {
    #[serde(default)]
    results: Vec<RawListing>,
}

/// One search result. Numeric fields arrive as JSON numbers that may be
/// integers or floats, or be missing entirely.
#[derive(Debug, Deserialize, Default)]
struct RawListing {
    #[serde(default)]
    list_price: Option<Decimal>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    list_date: Option<String>,
    #[serde(default)]
    location: Option<RawLocation>,
    #[serde(default)]
    description: Option<RawDescription>,
}

#[derive(Debug, Deserialize, Default)]
struct RawLocation {
    #[serde(default)]
    address: Option<RawAddress>,
}

#[derive(Debug, Deserialize, Default)]
struct RawAddress {
    #[serde(default)]
    line: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state_code: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RawDescription {
    #[serde(default)]
    beds: Option<f64>,
    #[serde(default)]
    baths: Option<Decimal>,
    #[serde(default)]
    sqft: Option<f64>,
    #[serde(default)]
    lot_sqft: Option<f64>,
    #[serde(default)]
    year_built: Option<f64>,
    #[serde(default, rename = "type")]
    property_type: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

fn whole<T: TryFrom<u64>>(value: Option<f64>) -> Option<T> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .and_then(|v| T::try_from(v.round() as u64).ok())
}

impl RawListing {
    fn address(&self) -> RawAddress {
        self.location
            .as_ref()
            .and_then(|l| l.address.as_ref())
            .map(|a| RawAddress {
                line: a.line.clone(),
                city: a.city.clone(),
                state_code: a.state_code.clone(),
                postal_code: a.postal_code.clone(),
            })
            .unwrap_or_default()
    }

    fn into_property(self) -> PropertyInfo {
        let address = self.address();
        let description = self.description.unwrap_or_default();

        PropertyInfo {
            address: address.line.unwrap_or_else(|| "N/A".to_string()),
            city: address.city,
            state: address.state_code,
            postal_code: address.postal_code,
            list_price: self.list_price,
            bedrooms: whole(description.beds),
            bathrooms: description.baths,
            sqft: whole(description.sqft).filter(|s: &u32| *s > 0),
            lot_sqft: whole(description.lot_sqft),
            year_built: whole::<u32>(description.year_built)
                .filter(|y| *y > 0)
                .and_then(|y| i32::try_from(y).ok()),
            property_type: description.property_type,
            status: self.status,
            list_date: self.list_date,
            description: description.text.filter(|t| !t.is_empty()),
        }
    }

    fn into_comparable(self) -> Comparable {
        let address = self.address();
        Comparable {
            address: address.line,
            list_price: self.list_price,
            sqft: self.description.and_then(|d| whole(d.sqft)),
            status: self.status,
        }
    }
}

fn results(body: ListResponse) -> Vec<RawListing> {
    body.data
        .and_then(|d| d.home_search)
        .map(|h| h.results)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// RapidAPI Realtor client.
pub struct RealtorClient {
    http: Client,
    api_key: SecretString,
    host: String,
    base_url: String,
}

impl RealtorClient {
    pub fn new(api_key: SecretString, host: Option<String>, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build Realtor HTTP client")?;

        let host = host.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let base_url = format!("https://{host}");

        Ok(Self {
            http,
            api_key,
            host,
            base_url,
        })
    }

    /// Override the base URL (for proxies and local test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn property_payload(query: &AddressQuery) -> serde_json::Value {
        let mut payload = json!({
            "limit": 1,
            "offset": 0,
            "status": ["for_sale", "ready_to_build"],
            "sort": {"direction": "desc", "field": "list_date"},
        });
        if let Some(city) = &query.city {
            payload["city"] = json!(city);
        }
        if let Some(state) = &query.state {
            payload["state_code"] = json!(state);
        }
        payload
    }

    fn comparables_payload(query: &ComparableQuery) -> serde_json::Value {
        json!({
            "limit": query.limit,
            "offset": 0,
            "city": query.city,
            "state_code": query.state,
            "status": ["for_sale", "sold"],
            "sort": {"direction": "desc", "field": "list_date"},
            "list_price": {"min": query.min_price, "max": query.max_price},
        })
    }

    /// POST a search with retry + exponential backoff on 429/5xx.
    async fn search(&self, payload: &serde_json::Value) -> Result<Vec<RawListing>> {
        let url = format!("{}/properties/v3/list", self.base_url);
        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = BASE_BACKOFF_MS * 2u64.pow(attempt - 1);
                debug!(attempt, delay_ms = delay, "Retrying Realtor search");
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            }

            let resp = self
                .http
                .post(&url)
                .header("Content-Type", "application/json")
                .header("X-RapidAPI-Host", &self.host)
                .header("X-RapidAPI-Key", self.api_key.expose_secret())
                .json(payload)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let body: ListResponse = response
                            .json()
                            .await
                            .context("Failed to parse Realtor response")?;
                        return Ok(results(body));
                    }

                    let error_text = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!(status = %status, attempt, error = %error_text, "Retryable Realtor error");
                        last_error = Some(format!("HTTP {status}: {error_text}"));
                        continue;
                    }

                    return Err(DealError::Listing {
                        provider: PROVIDER_NAME.to_string(),
                        message: format!("HTTP {status}: {error_text}"),
                    }
                    .into());
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Realtor request failed");
                    last_error = Some(format!("Request error: {e}"));
                }
            }
        }

        Err(DealError::Listing {
            provider: PROVIDER_NAME.to_string(),
            message: format!(
                "failed after {MAX_RETRIES} retries: {}",
                last_error.unwrap_or_default()
            ),
        }
        .into())
    }
}

#[async_trait]
impl ListingProvider for RealtorClient {
    async fn fetch_property(&self, query: &AddressQuery) -> Result<PropertyInfo> {
        let payload = Self::property_payload(query);
        debug!(address = %query.raw, city = ?query.city, state = ?query.state, "Fetching property");

        let listing = self
            .search(&payload)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DealError::PropertyNotFound(query.raw.clone()))?;

        let property = listing.into_property();
        info!(
            query = %query.raw,
            address = %property.address,
            price = ?property.list_price,
            sqft = ?property.sqft,
            year_built = ?property.year_built,
            "Property fetched"
        );
        Ok(property)
    }

    async fn fetch_comparables(&self, query: &ComparableQuery) -> Result<Vec<Comparable>> {
        let payload = Self::comparables_payload(query);
        let comps: Vec<Comparable> = self
            .search(&payload)
            .await?
            .into_iter()
            .map(RawListing::into_comparable)
            .collect();

        info!(
            city = %query.city,
            state = %query.state,
            min = %query.min_price,
            max = %query.max_price,
            count = comps.len(),
            "Comparables fetched"
        );
        Ok(comps)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
