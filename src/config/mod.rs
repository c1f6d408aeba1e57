use rust_decimal::Decimal;
use std::env;

const DEFAULT_EVM_API_BASE: &str = "https://deep-index.moralis.io/api/v2.2";
const DEFAULT_SOLANA_RPC_BASE: &str = "https://mainnet.helius-rpc.com";
const DEFAULT_SOLANA_API_BASE: &str = "https://api.helius.xyz";
const DEFAULT_BITCOIN_API_BASE: &str = "https://blockstream.info/api";
const DEFAULT_PRICE_API_BASE: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Provider credentials (optional — a missing key disables that family)
    pub evm_api_key: Option<String>,
    pub solana_api_key: Option<String>,

    // Provider endpoints (overridable for self-hosted gateways and tests)
    pub evm_api_base: String,
    pub solana_rpc_base: String,
    pub solana_api_base: String,
    pub bitcoin_api_base: String,
    pub price_api_base: String,

    // API auth — when unset, authentication is disabled (dev mode)
    pub api_token: Option<String>,

    // Timeouts
    pub request_timeout_secs: u64,
    pub adapter_timeout_secs: u64,

    // Alerts
    pub alert_min_value_usd: Decimal,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            evm_api_key: env::var("EVM_API_KEY").ok().filter(|k| !k.is_empty()),
            solana_api_key: env::var("SOLANA_API_KEY").ok().filter(|k| !k.is_empty()),

            evm_api_base: env::var("EVM_API_BASE")
                .unwrap_or_else(|_| DEFAULT_EVM_API_BASE.into()),
            solana_rpc_base: env::var("SOLANA_RPC_BASE")
                .unwrap_or_else(|_| DEFAULT_SOLANA_RPC_BASE.into()),
            solana_api_base: env::var("SOLANA_API_BASE")
                .unwrap_or_else(|_| DEFAULT_SOLANA_API_BASE.into()),
            bitcoin_api_base: env::var("BITCOIN_API_BASE")
                .unwrap_or_else(|_| DEFAULT_BITCOIN_API_BASE.into()),
            price_api_base: env::var("PRICE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_PRICE_API_BASE.into()),

            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),

            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".into())
                .parse()
                .unwrap_or(15),
            adapter_timeout_secs: env::var("ADAPTER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),

            alert_min_value_usd: env::var("ALERT_MIN_VALUE_USD")
                .unwrap_or_else(|_| "10000".into())
                .parse()
                .unwrap_or(Decimal::from(10_000)),
        })
    }

    /// Returns true if the EVM data provider is usable.
    pub fn has_evm_key(&self) -> bool {
        self.evm_api_key.is_some()
    }

    /// Returns true if the Solana data provider is usable.
    pub fn has_solana_key(&self) -> bool {
        self.solana_api_key.is_some()
    }
}
