use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use rust_decimal::Decimal;

use super::{rewrite_ipfs, scale_raw_amount, ChainAdapter, ChainFetch};
use crate::models::{
    Blockchain, ChainFamily, DefiAsset, DefiPosition, DefiPositionKind, Nft, TokenBalance,
    TransactionKind, Transfer, Wallet,
};
use crate::providers::evm_client::{
    DefiProtocolPosition, Erc20Balance, Erc20Transfer, EvmNft, EvmTransaction,
};
use crate::providers::EvmClient;

/// Adapter for all EVM-compatible chains. One provider serves balances,
/// NFTs, transfer history, and DeFi positions for every supported chain,
/// selected via the chain slug.
#[derive(Debug, Clone)]
pub struct EvmAdapter {
    client: EvmClient,
}

impl EvmAdapter {
    pub fn new(client: EvmClient) -> Self {
        Self { client }
    }

    async fn fetch_wallet(&self, wallet: &Wallet) -> anyhow::Result<ChainFetch> {
        let chain = wallet.blockchain;
        let Some(slug) = chain.evm_slug() else {
            return Ok(ChainFetch::default());
        };
        let address = wallet.address.as_str();

        let (native, balances, nfts, native_txs, token_txs, defi) = tokio::join!(
            self.client.native_balance(address, slug),
            self.client.token_balances(address, slug),
            self.client.nfts(address, slug),
            self.client.native_transactions(address, slug),
            self.client.erc20_transfers(address, slug),
            self.client.defi_positions(address, slug),
        );

        let mut out = ChainFetch::default();

        let native = native?;
        if let Some(amount) = scale_raw_amount(&native.balance, chain.native_decimals()) {
            out.tokens.push(TokenBalance {
                symbol: chain.native_symbol().into(),
                name: chain.native_symbol().into(),
                chain,
                amount,
            });
        }

        for balance in &balances? {
            if let Some(token) = normalize_erc20(balance, chain) {
                out.tokens.push(token);
            }
        }

        for nft in &nfts? {
            if let Some(normalized) = normalize_nft(nft, chain) {
                out.nfts.push(normalized);
            }
        }

        for tx in &native_txs? {
            if let Some(transfer) = normalize_native_tx(address, tx, chain) {
                out.transfers.push(transfer);
            }
        }

        for tx in &token_txs? {
            if let Some(transfer) = normalize_erc20_transfer(address, tx, chain) {
                out.transfers.push(transfer);
            }
        }

        // DeFi coverage varies per chain; a failing positions endpoint
        // should not discard the wallet's balances and history.
        match defi {
            Ok(positions) => {
                for position in &positions {
                    if let Some(position) = normalize_defi(position, chain) {
                        out.defi_positions.push(position);
                    }
                }
            }
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    address = %wallet.address,
                    chain = %chain,
                    "DeFi positions unavailable for wallet"
                );
            }
        }

        Ok(out)
    }
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    fn supports_defi(&self) -> bool {
        true
    }

    async fn fetch(&self, wallets: &[Wallet]) -> anyhow::Result<ChainFetch> {
        let evm_wallets: Vec<&Wallet> = wallets
            .iter()
            .filter(|w| w.blockchain.family() == ChainFamily::Evm)
            .collect();

        let results = join_all(evm_wallets.iter().map(|w| self.fetch_wallet(w))).await;

        let mut out = ChainFetch::default();
        for (wallet, result) in evm_wallets.iter().zip(results) {
            match result {
                Ok(fetch) => out.extend(fetch),
                Err(e) => {
                    metrics::counter!("provider_failures_total").increment(1);
                    tracing::warn!(
                        error = %e,
                        address = %wallet.address,
                        chain = %wallet.blockchain,
                        "EVM fetch failed for wallet, skipping"
                    );
                }
            }
        }

        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn normalize_erc20(balance: &Erc20Balance, chain: Blockchain) -> Option<TokenBalance> {
    if balance.possible_spam == Some(true) {
        return None;
    }

    let symbol = balance.symbol.as_deref()?.trim();
    if symbol.is_empty() {
        return None;
    }

    // Missing decimals would silently corrupt the amount; drop instead.
    let decimals = balance.decimals?;
    let amount = scale_raw_amount(&balance.balance, decimals)?;
    if amount.is_zero() {
        return None;
    }

    Some(TokenBalance {
        symbol: symbol.to_string(),
        name: balance
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| symbol.to_string()),
        chain,
        amount,
    })
}

fn normalize_nft(nft: &EvmNft, chain: Blockchain) -> Option<Nft> {
    // Only entries with resolvable image metadata are kept.
    let image = nft.image_url()?;

    // Item-level name lives in the metadata; `name` on the record itself
    // is the contract/collection name.
    let item_name = nft
        .normalized_metadata
        .as_ref()
        .and_then(|m| m.name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("#{}", nft.token_id));

    let collection = nft
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| item_name.clone());

    Some(Nft {
        id: format!("{}:{}", nft.token_address, nft.token_id),
        name: item_name,
        collection,
        image_url: rewrite_ipfs(&image),
        floor_price: None,
        chain,
        marketplace_url: opensea_url(chain, &nft.token_address, &nft.token_id),
    })
}

fn normalize_native_tx(wallet: &str, tx: &EvmTransaction, chain: Blockchain) -> Option<Transfer> {
    let to = tx.to_address.as_deref().unwrap_or_default();
    let amount = scale_raw_amount(&tx.value, chain.native_decimals())?;
    let kind = transfer_kind(wallet, &tx.from_address, to)?;
    if amount.is_zero() {
        return None;
    }

    Some(Transfer {
        hash: tx.hash.clone(),
        kind,
        timestamp: parse_block_timestamp(&tx.block_timestamp)?,
        symbol: chain.native_symbol().into(),
        chain,
        amount,
        value_usd: None,
        from: tx.from_address.clone(),
        to: to.to_string(),
    })
}

fn normalize_erc20_transfer(
    wallet: &str,
    tx: &Erc20Transfer,
    chain: Blockchain,
) -> Option<Transfer> {
    let symbol = tx.token_symbol.as_deref()?.trim();
    if symbol.is_empty() {
        return None;
    }

    let decimals: u32 = tx.token_decimals.as_deref()?.parse().ok()?;
    let amount = scale_raw_amount(&tx.value, decimals)?;
    if amount.is_zero() {
        return None;
    }
    let kind = transfer_kind(wallet, &tx.from_address, &tx.to_address)?;

    Some(Transfer {
        hash: tx.transaction_hash.clone(),
        kind,
        timestamp: parse_block_timestamp(&tx.block_timestamp)?,
        symbol: symbol.to_string(),
        chain,
        amount,
        value_usd: None,
        from: tx.from_address.clone(),
        to: tx.to_address.clone(),
    })
}

fn normalize_defi(position: &DefiProtocolPosition, chain: Blockchain) -> Option<DefiPosition> {
    let raw = position.position.as_ref()?;
    // A position without a USD value is unusable, not zero.
    let value_usd = raw.balance_usd?;

    let kind = raw
        .label
        .as_deref()
        .map(DefiPositionKind::from_provider_label)
        .unwrap_or(DefiPositionKind::Other);

    let assets = raw
        .tokens
        .iter()
        .filter_map(|t| {
            Some(DefiAsset {
                symbol: t.symbol.clone()?,
                amount: t.balance_formatted.unwrap_or(Decimal::ZERO),
                value_usd: t.usd_value.unwrap_or(Decimal::ZERO),
            })
        })
        .collect();

    Some(DefiPosition {
        platform: position.protocol_name.clone().unwrap_or_else(|| "Unknown".into()),
        platform_logo: position.protocol_logo.clone(),
        kind,
        assets,
        value_usd,
        apy: raw.position_details.as_ref().and_then(|d| d.apy),
        rewards_usd: raw.total_unclaimed_usd_value,
        chain,
        manage_url: position.protocol_url.clone(),
    })
}

/// Direction relative to the queried wallet. Self-transfers are non-events.
fn transfer_kind(wallet: &str, from: &str, to: &str) -> Option<TransactionKind> {
    let is_sender = from.eq_ignore_ascii_case(wallet);
    let is_recipient = to.eq_ignore_ascii_case(wallet);

    match (is_sender, is_recipient) {
        (true, true) => None,
        (true, false) => Some(TransactionKind::Send),
        (false, true) => Some(TransactionKind::Receive),
        // Not addressed to the queried wallet at all — provider noise.
        (false, false) => None,
    }
}

fn parse_block_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn opensea_url(chain: Blockchain, token_address: &str, token_id: &str) -> String {
    let slug = match chain {
        Blockchain::Ethereum => "ethereum",
        Blockchain::Polygon => "matic",
        Blockchain::Bsc => "bsc",
        Blockchain::Arbitrum => "arbitrum",
        Blockchain::Optimism => "optimism",
        Blockchain::Base => "base",
        Blockchain::Avalanche => "avalanche",
        // Non-EVM chains never reach this adapter.
        Blockchain::Solana | Blockchain::Bitcoin => "ethereum",
    };
    format!("https://opensea.io/assets/{slug}/{token_address}/{token_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn erc20(symbol: Option<&str>, decimals: Option<u32>, balance: &str, spam: bool) -> Erc20Balance {
        Erc20Balance {
            token_address: "0xtoken".into(),
            symbol: symbol.map(str::to_string),
            name: None,
            decimals,
            balance: balance.into(),
            possible_spam: Some(spam),
        }
    }

    #[test]
    fn test_erc20_scales_by_decimals() {
        let token =
            normalize_erc20(&erc20(Some("USDC"), Some(6), "2500000", false), Blockchain::Ethereum)
                .unwrap();
        assert_eq!(token.amount, Decimal::new(25, 1)); // 2.5
        assert_eq!(token.symbol, "USDC");
    }

    #[test]
    fn test_erc20_missing_decimals_is_dropped() {
        // Defaulting would report a 10^18-times-too-large amount.
        let result = normalize_erc20(
            &erc20(Some("WETH"), None, "1000000000000000000", false),
            Blockchain::Ethereum,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_erc20_spam_is_dropped() {
        let result = normalize_erc20(
            &erc20(Some("FREE-AIRDROP"), Some(18), "1000", true),
            Blockchain::Ethereum,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_transfer_direction_is_relative_to_wallet() {
        assert_eq!(
            transfer_kind("0xME", "0xme", "0xother"),
            Some(TransactionKind::Send)
        );
        assert_eq!(
            transfer_kind("0xME", "0xother", "0xme"),
            Some(TransactionKind::Receive)
        );
        assert_eq!(transfer_kind("0xME", "0xme", "0xME"), None);
    }

    #[test]
    fn test_zero_value_native_tx_is_dropped() {
        let tx = EvmTransaction {
            hash: "0xh".into(),
            from_address: "0xme".into(),
            to_address: Some("0xother".into()),
            value: "0".into(),
            block_timestamp: "2024-03-01T12:00:00.000Z".into(),
        };
        assert!(normalize_native_tx("0xme", &tx, Blockchain::Ethereum).is_none());
    }

    #[test]
    fn test_unknown_defi_label_maps_to_other() {
        let position = DefiProtocolPosition {
            protocol_name: Some("somedex".into()),
            protocol_logo: None,
            protocol_url: None,
            position: Some(crate::providers::evm_client::RawDefiPosition {
                label: Some("options-vault".into()),
                balance_usd: Some(Decimal::from(150)),
                total_unclaimed_usd_value: None,
                tokens: vec![],
                position_details: None,
            }),
        };
        let normalized = normalize_defi(&position, Blockchain::Ethereum).unwrap();
        assert_eq!(normalized.kind, DefiPositionKind::Other);
        assert_eq!(normalized.value_usd, Decimal::from(150));
    }

    #[test]
    fn test_defi_without_usd_value_is_dropped() {
        let position = DefiProtocolPosition {
            protocol_name: Some("somedex".into()),
            protocol_logo: None,
            protocol_url: None,
            position: Some(crate::providers::evm_client::RawDefiPosition {
                label: Some("staking".into()),
                balance_usd: None,
                total_unclaimed_usd_value: None,
                tokens: vec![],
                position_details: None,
            }),
        };
        assert!(normalize_defi(&position, Blockchain::Ethereum).is_none());
    }
}
