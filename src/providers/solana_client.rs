use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const SOLANA_RPC_BASE: &str = "https://mainnet.helius-rpc.com";
const SOLANA_API_BASE: &str = "https://api.helius.xyz";

#[derive(Debug, Error)]
pub enum SolanaClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(String),
}

// ---------------------------------------------------------------------------
// Owned-assets response (DAS getAssetsByOwner)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct RpcEnvelope<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Clone, Deserialize)]
struct RpcError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsResult {
    #[serde(default)]
    pub items: Vec<Asset>,
    #[serde(default, rename = "nativeBalance")]
    pub native_balance: Option<SolNativeBalance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolNativeBalance {
    #[serde(default)]
    pub lamports: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub id: String,
    /// Asset interface type, e.g. "FungibleToken" or "V1_NFT".
    #[serde(default)]
    pub interface: String,
    #[serde(default)]
    pub content: Option<AssetContent>,
    #[serde(default)]
    pub grouping: Vec<AssetGrouping>,
    #[serde(default)]
    pub token_info: Option<TokenInfo>,
}

impl Asset {
    pub fn is_fungible(&self) -> bool {
        matches!(self.interface.as_str(), "FungibleToken" | "FungibleAsset")
    }

    /// NFTs are identified by their collection grouping.
    pub fn collection(&self) -> Option<&str> {
        self.grouping
            .iter()
            .find(|g| g.group_key == "collection")
            .map(|g| g.group_value.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetContent {
    #[serde(default)]
    pub links: Option<AssetLinks>,
    #[serde(default)]
    pub metadata: Option<AssetMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetLinks {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetGrouping {
    #[serde(default)]
    pub group_key: String,
    #[serde(default)]
    pub group_value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
    /// Raw balance in the token's smallest unit.
    #[serde(default)]
    pub balance: Option<u128>,
}

// ---------------------------------------------------------------------------
// Enriched transaction history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTransaction {
    pub signature: String,
    /// Unix seconds.
    #[serde(default)]
    pub timestamp: i64,
    /// Provider-inferred type, e.g. "SWAP" or "TRANSFER".
    #[serde(default, rename = "type")]
    pub tx_type: Option<String>,
    #[serde(default)]
    pub token_transfers: Vec<SolTokenTransfer>,
    #[serde(default)]
    pub native_transfers: Vec<SolNativeTransfer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolTokenTransfer {
    #[serde(default)]
    pub from_user_account: Option<String>,
    #[serde(default)]
    pub to_user_account: Option<String>,
    #[serde(default)]
    pub mint: String,
    /// Pre-scaled amount the provider computed; the raw form is preferred
    /// when present so scaling uses our own decimals source.
    #[serde(default)]
    pub token_amount: Option<Decimal>,
    #[serde(default)]
    pub raw_token_amount: Option<RawTokenAmount>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenAmount {
    #[serde(default)]
    pub token_amount: String,
    #[serde(default)]
    pub decimals: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolNativeTransfer {
    #[serde(default)]
    pub from_user_account: Option<String>,
    #[serde(default)]
    pub to_user_account: Option<String>,
    /// Lamports.
    #[serde(default)]
    pub amount: i64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the Solana RPC + enriched-transaction provider.
/// Authenticated with an `api-key` query parameter on both surfaces.
#[derive(Debug, Clone)]
pub struct SolanaClient {
    http: Client,
    rpc_base: String,
    api_base: String,
    api_key: String,
}

impl SolanaClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            http,
            rpc_base: SOLANA_RPC_BASE.into(),
            api_base: SOLANA_API_BASE.into(),
            api_key,
        }
    }

    pub fn with_base_urls(
        http: Client,
        api_key: String,
        rpc_base: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            rpc_base: rpc_base.into(),
            api_base: api_base.into(),
            api_key,
        }
    }

    /// Fetch all assets owned by an address, including the native SOL
    /// balance and fungible token accounts.
    pub async fn assets_by_owner(&self, owner: &str) -> Result<AssetsResult, SolanaClientError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": "chainfolio",
            "method": "getAssetsByOwner",
            "params": {
                "ownerAddress": owner,
                "page": 1,
                "limit": 1000,
                "displayOptions": {
                    "showFungible": true,
                    "showNativeBalance": true,
                },
            },
        });

        let resp = self
            .http
            .post(&self.rpc_base)
            .query(&[("api-key", &self.api_key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let envelope: RpcEnvelope<AssetsResult> = resp.json().await?;
        if let Some(err) = envelope.error {
            return Err(SolanaClientError::Rpc(err.message));
        }
        envelope
            .result
            .ok_or_else(|| SolanaClientError::Rpc("empty result".into()))
    }

    /// Fetch enriched (pre-parsed) transaction history for an address.
    pub async fn transactions(
        &self,
        address: &str,
    ) -> Result<Vec<EnrichedTransaction>, SolanaClientError> {
        let url = format!("{}/v0/addresses/{}/transactions", self.api_base, address);
        let resp = self
            .http
            .get(&url)
            .query(&[("api-key", &self.api_key)])
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }
}
