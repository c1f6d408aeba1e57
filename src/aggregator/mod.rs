use futures_util::future::join_all;
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::adapters::{BitcoinAdapter, ChainAdapter, ChainFetch, EvmAdapter, SolanaAdapter};
use crate::config::AppConfig;
use crate::models::{
    Blockchain, ChainFamily, DefiPosition, Nft, Token, TokenBalance, Transaction, Transfer,
    PortfolioValue, Wallet,
};
use crate::pricing::{price_id_for, MarketDataOracle, PriceQuote, PriceSource};
use crate::providers::{BitcoinClient, EvmClient, PriceClient, SolanaClient};

/// Data-volume contract on the returned transaction list.
pub const TRANSACTION_CAP: usize = 100;

/// What one enabled chain family can provide.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FamilyCapability {
    pub family: ChainFamily,
    pub supports_defi: bool,
}

/// The four finalized lists for a wallet set. The value summary is computed
/// separately by callers (`compute_portfolio_value`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatedAssets {
    pub tokens: Vec<Token>,
    pub nfts: Vec<Nft>,
    pub transactions: Vec<Transaction>,
    pub defi_positions: Vec<DefiPosition>,
}

/// Fans a wallet list out to the applicable chain adapters in parallel,
/// merges their partial outputs, resolves prices once for the whole batch,
/// and finalizes USD values.
///
/// Never fails: provider errors and timeouts degrade to empty results for
/// that scope, so the output only varies in completeness.
pub struct Aggregator {
    adapters: Vec<Arc<dyn ChainAdapter>>,
    oracle: Arc<dyn PriceSource>,
    adapter_timeout: Duration,
}

impl Aggregator {
    pub fn new(
        adapters: Vec<Arc<dyn ChainAdapter>>,
        oracle: Arc<dyn PriceSource>,
        adapter_timeout: Duration,
    ) -> Self {
        Self {
            adapters,
            oracle,
            adapter_timeout,
        }
    }

    /// Build the production aggregator. Families missing a required API
    /// credential get no adapter and simply contribute nothing; Bitcoin's
    /// explorer needs no credential and is always available.
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        let mut adapters: Vec<Arc<dyn ChainAdapter>> = Vec::new();

        match &config.evm_api_key {
            Some(key) => {
                adapters.push(Arc::new(EvmAdapter::new(EvmClient::with_base_url(
                    http.clone(),
                    key.clone(),
                    config.evm_api_base.clone(),
                ))));
            }
            None => tracing::warn!("EVM_API_KEY not set — EVM chains disabled"),
        }

        match &config.solana_api_key {
            Some(key) => {
                adapters.push(Arc::new(SolanaAdapter::new(SolanaClient::with_base_urls(
                    http.clone(),
                    key.clone(),
                    config.solana_rpc_base.clone(),
                    config.solana_api_base.clone(),
                ))));
            }
            None => tracing::warn!("SOLANA_API_KEY not set — Solana disabled"),
        }

        adapters.push(Arc::new(BitcoinAdapter::new(BitcoinClient::with_base_url(
            http.clone(),
            config.bitcoin_api_base.clone(),
        ))));

        let oracle = MarketDataOracle::new(PriceClient::with_base_url(
            http,
            config.price_api_base.clone(),
        ));

        Self::new(
            adapters,
            Arc::new(oracle),
            Duration::from_secs(config.adapter_timeout_secs),
        )
    }

    /// Chain families this aggregator can serve.
    pub fn enabled_families(&self) -> Vec<ChainFamily> {
        self.adapters.iter().map(|a| a.family()).collect()
    }

    /// Per-family capability map. DeFi support is a provider capability
    /// gap, surfaced here so callers don't infer it from empty lists.
    pub fn capabilities(&self) -> Vec<FamilyCapability> {
        self.adapters
            .iter()
            .map(|a| FamilyCapability {
                family: a.family(),
                supports_defi: a.supports_defi(),
            })
            .collect()
    }

    /// Aggregate all wallets into finalized token/NFT/transaction/DeFi
    /// lists. See the struct docs for the failure contract.
    pub async fn aggregate(&self, wallets: &[Wallet]) -> AggregatedAssets {
        if wallets.is_empty() {
            return AggregatedAssets::default();
        }

        let start = Instant::now();
        counter!("aggregations_total").increment(1);

        let fetched = self.fan_out(wallets).await;

        let mut nfts = Vec::new();
        let mut transfers: Vec<Transfer> = Vec::new();
        let mut defi_positions = Vec::new();
        let mut balances: Vec<TokenBalance> = Vec::new();

        for fetch in fetched {
            balances.extend(fetch.tokens);
            nfts.extend(fetch.nfts);
            transfers.extend(fetch.transfers);
            defi_positions.extend(fetch.defi_positions);
        }

        let merged = merge_tokens(balances);

        // One oracle query for every distinct asset the batch touches.
        let mut price_ids: BTreeSet<String> = BTreeSet::new();
        for token in &merged {
            price_ids.insert(price_id_for(&token.symbol, token.chain));
        }
        for transfer in &transfers {
            price_ids.insert(price_id_for(&transfer.symbol, transfer.chain));
        }
        let ids: Vec<String> = price_ids.into_iter().collect();
        let quotes = self.oracle.quotes(&ids).await;

        let tokens = finalize_tokens(merged, &quotes);
        let transactions = finalize_transactions(transfers, &quotes);

        histogram!("aggregation_latency_seconds").record(start.elapsed().as_secs_f64());

        AggregatedAssets {
            tokens,
            nfts,
            transactions,
            defi_positions,
        }
    }

    /// Invoke every applicable adapter concurrently. A throwing or hanging
    /// adapter is replaced by an empty fetch — partial provider failure
    /// never prevents data from the providers that succeeded.
    async fn fan_out(&self, wallets: &[Wallet]) -> Vec<ChainFetch> {
        let batches: Vec<(&Arc<dyn ChainAdapter>, Vec<Wallet>)> = self
            .adapters
            .iter()
            .map(|adapter| {
                let family = adapter.family();
                let batch: Vec<Wallet> = wallets
                    .iter()
                    .filter(|w| w.blockchain.family() == family)
                    .cloned()
                    .collect();
                (adapter, batch)
            })
            .filter(|(_, batch)| !batch.is_empty())
            .collect();

        let futures = batches.into_iter().map(|(adapter, batch)| {
            let adapter = Arc::clone(adapter);
            let adapter_timeout = self.adapter_timeout;
            async move {
                let family = adapter.family();
                match timeout(adapter_timeout, adapter.fetch(&batch)).await {
                    Ok(Ok(fetch)) => fetch,
                    Ok(Err(e)) => {
                        counter!("provider_failures_total").increment(1);
                        tracing::warn!(
                            error = %e,
                            family = ?family,
                            "Chain adapter failed, substituting empty result"
                        );
                        ChainFetch::default()
                    }
                    Err(_) => {
                        counter!("adapter_timeouts_total").increment(1);
                        tracing::warn!(
                            family = ?family,
                            timeout_secs = adapter_timeout.as_secs(),
                            "Chain adapter timed out, substituting empty result"
                        );
                        ChainFetch::default()
                    }
                }
            }
        });

        join_all(futures).await
    }
}

// ---------------------------------------------------------------------------
// Merge + finalize
// ---------------------------------------------------------------------------

/// Group balances by (symbol lowercased, chain), summing amounts. This
/// combines holdings of the same asset across providers and wallets.
/// Relative order of the merged output is not guaranteed.
pub fn merge_tokens(balances: Vec<TokenBalance>) -> Vec<TokenBalance> {
    let mut merged: HashMap<(String, Blockchain), TokenBalance> = HashMap::new();

    for balance in balances {
        merged
            .entry(balance.merge_key())
            .and_modify(|existing| existing.amount += balance.amount)
            .or_insert(balance);
    }

    merged.into_values().collect()
}

fn finalize_tokens(
    balances: Vec<TokenBalance>,
    quotes: &HashMap<String, PriceQuote>,
) -> Vec<Token> {
    balances
        .into_iter()
        .map(|balance| {
            let quote = quotes.get(&price_id_for(&balance.symbol, balance.chain));
            let price = quote.map(|q| q.usd).unwrap_or(Decimal::ZERO);
            let change = quote.map(|q| q.change_24h).unwrap_or(Decimal::ZERO);
            Token::from_balance(balance, price, change)
        })
        .collect()
}

fn finalize_transactions(
    transfers: Vec<Transfer>,
    quotes: &HashMap<String, PriceQuote>,
) -> Vec<Transaction> {
    let mut transactions: Vec<Transaction> = transfers
        .into_iter()
        .map(|transfer| {
            let resolved = quotes
                .get(&price_id_for(&transfer.symbol, transfer.chain))
                .map(|q| transfer.amount * q.usd)
                .unwrap_or(Decimal::ZERO);
            Transaction::from_transfer(transfer, resolved)
        })
        .collect();

    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    transactions.truncate(TRANSACTION_CAP);
    transactions
}

/// Compute the aggregate value summary from finalized lists.
///
/// The absolute 24h delta is derived per token from its 24h percent change
/// (`value * pct / (100 + pct)` — i.e. today's value minus yesterday's);
/// DeFi positions contribute value but no delta, since the provider reports
/// no 24h figure for them.
pub fn compute_portfolio_value(
    tokens: &[Token],
    defi_positions: &[DefiPosition],
) -> PortfolioValue {
    let token_value: Decimal = tokens.iter().map(|t| t.value).sum();
    let defi_value: Decimal = defi_positions.iter().map(|p| p.value_usd).sum();
    let total = token_value + defi_value;

    let mut change_24h = Decimal::ZERO;
    for token in tokens {
        let base = Decimal::ONE_HUNDRED + token.change_24h;
        // A -100% mover had no value yesterday either way.
        if !base.is_zero() {
            change_24h += token.value * token.change_24h / base;
        }
    }

    PortfolioValue {
        total,
        change_24h,
        change_24h_percent: change_percent(total, change_24h),
    }
}

/// `change / (total - change) * 100`, with 0 when yesterday's base is 0
/// (undefined growth).
pub fn change_percent(total: Decimal, change_24h: Decimal) -> Decimal {
    let previous = total - change_24h;
    if previous.is_zero() {
        return Decimal::ZERO;
    }
    change_24h / previous * Decimal::ONE_HUNDRED
}
