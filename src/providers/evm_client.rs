use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

const EVM_API_BASE: &str = "https://deep-index.moralis.io/api/v2.2";

#[derive(Debug, Error)]
pub enum EvmClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Cursor-paged envelope used by most list endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub result: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NativeBalance {
    /// Raw balance in wei, as an integer string.
    pub balance: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Erc20Balance {
    pub token_address: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
    /// Raw balance in the token's smallest unit, as an integer string.
    #[serde(default)]
    pub balance: String,
    #[serde(default)]
    pub possible_spam: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvmNftMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvmNft {
    pub token_address: String,
    pub token_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Stringified JSON metadata blob; `image` is extracted from it when
    /// the normalized form is absent.
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub normalized_metadata: Option<EvmNftMetadata>,
}

impl EvmNft {
    /// Best-effort image URL: normalized metadata first, then the raw
    /// metadata JSON blob. `None` when neither resolves.
    pub fn image_url(&self) -> Option<String> {
        if let Some(meta) = &self.normalized_metadata {
            if let Some(image) = &meta.image {
                if !image.is_empty() {
                    return Some(image.clone());
                }
            }
        }
        let raw = self.metadata.as_deref()?;
        let parsed: serde_json::Value = serde_json::from_str(raw).ok()?;
        parsed
            .get("image")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvmTransaction {
    pub hash: String,
    pub from_address: String,
    #[serde(default)]
    pub to_address: Option<String>,
    /// Transferred native value in wei, as an integer string.
    #[serde(default)]
    pub value: String,
    pub block_timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Erc20Transfer {
    pub transaction_hash: String,
    pub from_address: String,
    pub to_address: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub token_symbol: Option<String>,
    /// The provider returns decimals as a string on this endpoint.
    #[serde(default)]
    pub token_decimals: Option<String>,
    pub block_timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefiPositionToken {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub balance_formatted: Option<Decimal>,
    #[serde(default)]
    pub usd_value: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefiPositionDetails {
    #[serde(default)]
    pub apy: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDefiPosition {
    /// Provider category label, e.g. "liquidity" or "supplied".
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub balance_usd: Option<Decimal>,
    #[serde(default)]
    pub total_unclaimed_usd_value: Option<Decimal>,
    #[serde(default)]
    pub tokens: Vec<DefiPositionToken>,
    #[serde(default)]
    pub position_details: Option<DefiPositionDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefiProtocolPosition {
    #[serde(default)]
    pub protocol_name: Option<String>,
    #[serde(default)]
    pub protocol_logo: Option<String>,
    #[serde(default)]
    pub protocol_url: Option<String>,
    #[serde(default)]
    pub position: Option<RawDefiPosition>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// REST client for the EVM balance/NFT/transfer/DeFi provider.
/// Authenticated with an `X-API-Key` header; all endpoints are scoped to
/// one address on one chain (via the provider's chain slug).
#[derive(Debug, Clone)]
pub struct EvmClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl EvmClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            http,
            base_url: EVM_API_BASE.into(),
            api_key,
        }
    }

    pub fn with_base_url(http: Client, api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    pub async fn native_balance(
        &self,
        address: &str,
        chain: &str,
    ) -> Result<NativeBalance, EvmClientError> {
        let url = format!("{}/{}/balance", self.base_url, address);
        let resp = self
            .http
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(&[("chain", chain)])
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }

    pub async fn token_balances(
        &self,
        address: &str,
        chain: &str,
    ) -> Result<Vec<Erc20Balance>, EvmClientError> {
        let url = format!("{}/{}/erc20", self.base_url, address);
        let resp = self
            .http
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(&[("chain", chain)])
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }

    pub async fn nfts(&self, address: &str, chain: &str) -> Result<Vec<EvmNft>, EvmClientError> {
        let url = format!("{}/{}/nft", self.base_url, address);
        let resp = self
            .http
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(&[
                ("chain", chain),
                ("format", "decimal"),
                ("normalizeMetadata", "true"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let page: Page<EvmNft> = resp.json().await?;
        Ok(page.result)
    }

    pub async fn native_transactions(
        &self,
        address: &str,
        chain: &str,
    ) -> Result<Vec<EvmTransaction>, EvmClientError> {
        let url = format!("{}/{}", self.base_url, address);
        let resp = self
            .http
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(&[("chain", chain)])
            .send()
            .await?
            .error_for_status()?;

        let page: Page<EvmTransaction> = resp.json().await?;
        Ok(page.result)
    }

    pub async fn erc20_transfers(
        &self,
        address: &str,
        chain: &str,
    ) -> Result<Vec<Erc20Transfer>, EvmClientError> {
        let url = format!("{}/{}/erc20/transfers", self.base_url, address);
        let resp = self
            .http
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(&[("chain", chain)])
            .send()
            .await?
            .error_for_status()?;

        let page: Page<Erc20Transfer> = resp.json().await?;
        Ok(page.result)
    }

    pub async fn defi_positions(
        &self,
        address: &str,
        chain: &str,
    ) -> Result<Vec<DefiProtocolPosition>, EvmClientError> {
        let url = format!("{}/wallets/{}/defi/positions", self.base_url, address);
        let resp = self
            .http
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(&[("chain", chain)])
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nft_image_prefers_normalized_metadata() {
        let nft = EvmNft {
            token_address: "0xabc".into(),
            token_id: "1".into(),
            name: None,
            metadata: Some(r#"{"image":"ipfs://raw"}"#.into()),
            normalized_metadata: Some(EvmNftMetadata {
                name: None,
                image: Some("https://cdn.example/1.png".into()),
            }),
        };
        assert_eq!(nft.image_url().as_deref(), Some("https://cdn.example/1.png"));
    }

    #[test]
    fn test_nft_image_falls_back_to_raw_metadata() {
        let nft = EvmNft {
            token_address: "0xabc".into(),
            token_id: "1".into(),
            name: None,
            metadata: Some(r#"{"image":"ipfs://QmHash"}"#.into()),
            normalized_metadata: None,
        };
        assert_eq!(nft.image_url().as_deref(), Some("ipfs://QmHash"));
    }

    #[test]
    fn test_nft_image_unresolvable() {
        let nft = EvmNft {
            token_address: "0xabc".into(),
            token_id: "1".into(),
            name: None,
            metadata: Some("not json".into()),
            normalized_metadata: None,
        };
        assert!(nft.image_url().is_none());
    }
}
