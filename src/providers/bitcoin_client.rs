use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

const BITCOIN_API_BASE: &str = "https://blockstream.info/api";

#[derive(Debug, Error)]
pub enum BitcoinClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AddressStats {
    pub chain_stats: ChainStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainStats {
    /// Total satoshis ever received by the address.
    #[serde(default)]
    pub funded_txo_sum: u64,
    /// Total satoshis ever spent from the address.
    #[serde(default)]
    pub spent_txo_sum: u64,
}

impl ChainStats {
    /// Current confirmed balance in satoshis.
    pub fn balance_sats(&self) -> u64 {
        self.funded_txo_sum.saturating_sub(self.spent_txo_sum)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BtcTransaction {
    pub txid: String,
    #[serde(default)]
    pub status: TxStatus,
    #[serde(default)]
    pub vin: Vec<TxInput>,
    #[serde(default)]
    pub vout: Vec<TxOutput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxStatus {
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub block_time: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxInput {
    #[serde(default)]
    pub prevout: Option<TxOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxOutput {
    #[serde(default)]
    pub scriptpubkey_address: Option<String>,
    /// Satoshis.
    #[serde(default)]
    pub value: u64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the Bitcoin block-explorer REST API. No authentication.
#[derive(Debug, Clone)]
pub struct BitcoinClient {
    http: Client,
    base_url: String,
}

impl BitcoinClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: BITCOIN_API_BASE.into(),
        }
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn address_stats(&self, address: &str) -> Result<AddressStats, BitcoinClientError> {
        let url = format!("{}/address/{}", self.base_url, address);
        let resp = self.http.get(&url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Most recent transactions touching the address (newest first,
    /// explorer-paged; the first page is enough for the history cap).
    pub async fn transactions(
        &self,
        address: &str,
    ) -> Result<Vec<BtcTransaction>, BitcoinClientError> {
        let url = format!("{}/address/{}/txs", self.base_url, address);
        let resp = self.http.get(&url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }
}
