//! Public price API client.
//!
//! Best effort: a field missing from the response becomes zero, and the
//! caller decides what a failed request means for the view.

use chrono::Utc;
use serde_json::Value;
use std::time::Duration;

use crate::config::PriceConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::observability::metrics;
use crate::prices::types::{PriceQuote, PriceSnapshot};

/// Client for a `simple/price` style endpoint.
#[derive(Debug, Clone)]
pub struct PriceFeed {
    client: reqwest::Client,
    config: PriceConfig,
}

impl PriceFeed {
    pub fn new(config: PriceConfig) -> DashboardResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("adt-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DashboardError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn asset_ids(&self) -> &[String] {
        &self.config.asset_ids
    }

    /// Fetch current prices and 24h changes for every configured asset.
    pub async fn fetch(&self) -> DashboardResult<PriceSnapshot> {
        let result = self.request().await;
        metrics::record_price_fetch(if result.is_ok() { "ok" } else { "error" });
        let body = result?;

        Ok(PriceSnapshot {
            quotes: parse_quotes(&body, &self.config.asset_ids, &self.config.vs_currency),
            fetched_at: Some(Utc::now()),
            stale: false,
        })
    }

    async fn request(&self) -> DashboardResult<Value> {
        let ids = self.config.asset_ids.join(",");
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("ids", ids.as_str()),
                ("vs_currencies", self.config.vs_currency.as_str()),
                ("include_24hr_change", "true"),
            ])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?
            .error_for_status()
            .map_err(|e| DashboardError::Network(format!("price API: {}", e)))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| self.map_request_error(e))
    }

    fn map_request_error(&self, e: reqwest::Error) -> DashboardError {
        if e.is_timeout() {
            DashboardError::Timeout(self.config.request_timeout_secs)
        } else {
            DashboardError::Network(format!("price API: {}", e))
        }
    }
}

/// Pull `{id: {vs: price, vs_24h_change: change}}` out of a response body.
///
/// Quotes come back in `asset_ids` order. Anything absent or non-numeric is 0.
pub fn parse_quotes(body: &Value, asset_ids: &[String], vs_currency: &str) -> Vec<PriceQuote> {
    let change_key = format!("{}_24h_change", vs_currency);
    asset_ids
        .iter()
        .map(|id| {
            let entry = &body[id.as_str()];
            let price = entry[vs_currency].as_f64().unwrap_or_else(|| {
                tracing::warn!(
                    asset = %id,
                    currency = %vs_currency,
                    "Price missing from response, showing 0"
                );
                0.0
            });
            let change_24h = entry[change_key.as_str()].as_f64().unwrap_or(0.0);
            PriceQuote {
                asset_id: id.clone(),
                price,
                change_24h,
            }
        })
        .collect()
}
