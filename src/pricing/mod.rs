use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::Blockchain;
use crate::providers::{PriceClient, PriceClientError};

// ---------------------------------------------------------------------------
// Symbol → price-id resolution
// ---------------------------------------------------------------------------

/// Canonical market-data id for a ticker symbol. Covers the common assets;
/// anything else falls back to the lowercased symbol.
fn symbol_price_id(symbol: &str) -> Option<&'static str> {
    match symbol.to_lowercase().as_str() {
        "eth" | "weth" => Some("ethereum"),
        "btc" => Some("bitcoin"),
        "wbtc" => Some("wrapped-bitcoin"),
        "sol" => Some("solana"),
        "usdc" => Some("usd-coin"),
        "usdt" => Some("tether"),
        "dai" => Some("dai"),
        "matic" | "pol" => Some("matic-network"),
        "bnb" => Some("binancecoin"),
        "avax" => Some("avalanche-2"),
        "arb" => Some("arbitrum"),
        "op" => Some("optimism"),
        "link" => Some("chainlink"),
        "uni" => Some("uniswap"),
        "aave" => Some("aave"),
        "ldo" => Some("lido-dao"),
        "crv" => Some("curve-dao-token"),
        "shib" => Some("shiba-inu"),
        "pepe" => Some("pepe"),
        "bonk" => Some("bonk"),
        "wif" => Some("dogwifcoin"),
        "jup" => Some("jupiter-exchange-solana"),
        "jto" => Some("jito-governance-token"),
        "ray" => Some("raydium"),
        _ => None,
    }
}

/// Market-data id for a chain's native asset. Kept separate from the symbol
/// table because the same symbol prices differently depending on context
/// (ETH on Base still prices as "ethereum").
fn native_price_id(chain: Blockchain) -> &'static str {
    match chain {
        Blockchain::Ethereum
        | Blockchain::Arbitrum
        | Blockchain::Optimism
        | Blockchain::Base => "ethereum",
        Blockchain::Polygon => "matic-network",
        Blockchain::Bsc => "binancecoin",
        Blockchain::Avalanche => "avalanche-2",
        Blockchain::Solana => "solana",
        Blockchain::Bitcoin => "bitcoin",
    }
}

/// Resolve a (symbol, chain) pair to a price-lookup id.
///
/// Native assets resolve through the per-chain table; other symbols through
/// the static symbol table; unmapped symbols fall back to their lowercased
/// value as a best-effort guess.
pub fn price_id_for(symbol: &str, chain: Blockchain) -> String {
    if symbol.eq_ignore_ascii_case(chain.native_symbol()) {
        return native_price_id(chain).to_string();
    }
    match symbol_price_id(symbol) {
        Some(id) => id.to_string(),
        None => symbol.to_lowercase(),
    }
}

// ---------------------------------------------------------------------------
// PriceSource
// ---------------------------------------------------------------------------

/// USD price + 24h change for one asset id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub usd: Decimal,
    pub change_24h: Decimal,
}

/// Batch price resolution. Infallible by contract: implementations degrade
/// to an empty map rather than propagate, so unresolved assets simply price
/// at zero downstream.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn quotes(&self, ids: &[String]) -> HashMap<String, PriceQuote>;
}

/// Price oracle backed by the market-data REST API.
#[derive(Debug, Clone)]
pub struct MarketDataOracle {
    client: PriceClient,
}

impl MarketDataOracle {
    pub fn new(client: PriceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PriceSource for MarketDataOracle {
    async fn quotes(&self, ids: &[String]) -> HashMap<String, PriceQuote> {
        // Querying the same id twice wastes quota.
        let mut deduped: Vec<String> = ids.to_vec();
        deduped.sort();
        deduped.dedup();

        if deduped.is_empty() {
            return HashMap::new();
        }

        metrics::counter!("price_lookups_total").increment(1);

        let prices = match self.client.simple_price(&deduped).await {
            Ok(p) => p,
            Err(PriceClientError::RateLimited) => {
                // No fresh data available; downstream valuation treats
                // unresolved assets as price = 0.
                tracing::warn!("Price provider rate limited, returning empty price map");
                return HashMap::new();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Price lookup failed, returning empty price map");
                return HashMap::new();
            }
        };

        prices
            .into_iter()
            .filter_map(|(id, quote)| {
                let usd = quote.usd?;
                Some((
                    id,
                    PriceQuote {
                        usd,
                        change_24h: quote.usd_24h_change.unwrap_or(Decimal::ZERO),
                    },
                ))
            })
            .collect()
    }
}
