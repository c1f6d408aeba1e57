use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

const PRICE_API_BASE: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Error)]
pub enum PriceClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The market-data API is rate limited (429). Treated upstream as
    /// "no fresh data available", not a hard error.
    #[error("rate limited by price provider")]
    RateLimited,
}

/// One asset's quote from the market-data provider.
#[derive(Debug, Clone, Deserialize)]
pub struct SimplePrice {
    #[serde(default)]
    pub usd: Option<Decimal>,
    #[serde(default)]
    pub usd_24h_change: Option<Decimal>,
}

/// Thin client for the market-data price API. Unauthenticated in this
/// deployment; batch lookups only.
#[derive(Debug, Clone)]
pub struct PriceClient {
    http: Client,
    base_url: String,
}

impl PriceClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: PRICE_API_BASE.into(),
        }
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Batch USD price + 24h change lookup. Ids not known upstream are
    /// simply absent from the returned map.
    pub async fn simple_price(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, SimplePrice>, PriceClientError> {
        let url = format!("{}/simple/price", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("ids", ids.join(",")),
                ("vs_currencies", "usd".into()),
                ("include_24hr_change", "true".into()),
            ])
            .send()
            .await?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceClientError::RateLimited);
        }

        let prices: HashMap<String, SimplePrice> = resp.error_for_status()?.json().await?;
        Ok(prices)
    }
}
