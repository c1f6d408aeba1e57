use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::collections::HashMap;

use super::{resolve_image_url, scale_base_units, scale_raw_amount, ChainAdapter, ChainFetch};
use crate::models::{
    Blockchain, ChainFamily, Nft, TokenBalance, TransactionKind, Transfer, Wallet,
};
use crate::providers::solana_client::{Asset, AssetsResult, EnrichedTransaction};
use crate::providers::SolanaClient;

/// Fungible-token metadata extracted from the owned-assets call, keyed by
/// mint. Transaction amounts are scaled through this map so the decimals
/// source is our own, not the transfer record's.
type MintMetadata = HashMap<String, (String, u32)>;

/// Adapter for Solana. Assets come from the DAS owned-assets call (split
/// into native SOL, fungible tokens, and collection-grouped NFTs); history
/// comes from the enriched-transaction endpoint. No DeFi positions.
#[derive(Debug, Clone)]
pub struct SolanaAdapter {
    client: SolanaClient,
}

impl SolanaAdapter {
    pub fn new(client: SolanaClient) -> Self {
        Self { client }
    }

    async fn fetch_wallet(&self, wallet: &Wallet) -> anyhow::Result<ChainFetch> {
        let address = wallet.address.as_str();

        let (assets, transactions) = tokio::join!(
            self.client.assets_by_owner(address),
            self.client.transactions(address),
        );
        let assets = assets?;
        let transactions = transactions?;

        let mut out = ChainFetch::default();
        let mints = mint_metadata(&assets);

        if let Some(native) = &assets.native_balance {
            if native.lamports > 0 {
                if let Some(amount) =
                    scale_base_units(native.lamports as i128, Blockchain::Solana.native_decimals())
                {
                    out.tokens.push(TokenBalance {
                        symbol: "SOL".into(),
                        name: "Solana".into(),
                        chain: Blockchain::Solana,
                        amount,
                    });
                }
            }
        }

        for asset in &assets.items {
            if asset.is_fungible() {
                if let Some(token) = normalize_fungible(asset) {
                    out.tokens.push(token);
                }
            } else if let Some(nft) = normalize_nft(asset) {
                out.nfts.push(nft);
            }
        }

        for tx in &transactions {
            out.transfers
                .extend(normalize_transaction(address, tx, &mints));
        }

        Ok(out)
    }
}

#[async_trait]
impl ChainAdapter for SolanaAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Solana
    }

    async fn fetch(&self, wallets: &[Wallet]) -> anyhow::Result<ChainFetch> {
        let sol_wallets: Vec<&Wallet> = wallets
            .iter()
            .filter(|w| w.blockchain == Blockchain::Solana)
            .collect();

        let results = join_all(sol_wallets.iter().map(|w| self.fetch_wallet(w))).await;

        let mut out = ChainFetch::default();
        for (wallet, result) in sol_wallets.iter().zip(results) {
            match result {
                Ok(fetch) => out.extend(fetch),
                Err(e) => {
                    metrics::counter!("provider_failures_total").increment(1);
                    tracing::warn!(
                        error = %e,
                        address = %wallet.address,
                        "Solana fetch failed for wallet, skipping"
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

fn mint_metadata(assets: &AssetsResult) -> MintMetadata {
    let mut map = MintMetadata::new();
    for asset in &assets.items {
        if !asset.is_fungible() {
            continue;
        }
        let Some(info) = &asset.token_info else {
            continue;
        };
        if let (Some(symbol), Some(decimals)) = (info.symbol.clone(), info.decimals) {
            map.insert(asset.id.clone(), (symbol, decimals));
        }
    }
    map
}

fn normalize_fungible(asset: &Asset) -> Option<TokenBalance> {
    let info = asset.token_info.as_ref()?;
    let symbol = info.symbol.as_deref()?.trim();
    if symbol.is_empty() {
        return None;
    }

    let decimals = info.decimals?;
    let balance = info.balance?;
    let amount = scale_base_units(i128::try_from(balance).ok()?, decimals)?;
    if amount.is_zero() {
        return None;
    }

    let name = asset
        .content
        .as_ref()
        .and_then(|c| c.metadata.as_ref())
        .and_then(|m| m.name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| symbol.to_string());

    Some(TokenBalance {
        symbol: symbol.to_string(),
        name,
        chain: Blockchain::Solana,
        amount,
    })
}

fn normalize_nft(asset: &Asset) -> Option<Nft> {
    // NFTs are identified by their collection grouping.
    let collection = asset.collection()?.to_string();

    let metadata = asset.content.as_ref().and_then(|c| c.metadata.as_ref());
    let name = metadata
        .and_then(|m| m.name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| asset.id.clone());

    let image = asset
        .content
        .as_ref()
        .and_then(|c| c.links.as_ref())
        .and_then(|l| l.image.as_deref());

    Some(Nft {
        id: asset.id.clone(),
        name,
        collection,
        image_url: resolve_image_url(image),
        floor_price: None,
        chain: Blockchain::Solana,
        marketplace_url: format!("https://magiceden.io/item-details/{}", asset.id),
    })
}

fn normalize_transaction(
    wallet: &str,
    tx: &EnrichedTransaction,
    mints: &MintMetadata,
) -> Vec<Transfer> {
    let Some(timestamp) = DateTime::<Utc>::from_timestamp(tx.timestamp, 0) else {
        return Vec::new();
    };
    let is_swap = tx.tx_type.as_deref() == Some("SWAP");

    let mut transfers = Vec::new();

    for t in &tx.token_transfers {
        let from = t.from_user_account.as_deref().unwrap_or_default();
        let to = t.to_user_account.as_deref().unwrap_or_default();
        let Some(kind) = transfer_kind(wallet, from, to, is_swap) else {
            continue;
        };

        // Unknown mint means no trusted symbol/decimals; drop the record.
        let Some((symbol, decimals)) = mints.get(&t.mint) else {
            continue;
        };

        let amount = match &t.raw_token_amount {
            Some(raw) => scale_raw_amount(&raw.token_amount, raw.decimals.unwrap_or(*decimals)),
            None => t.token_amount,
        };
        let Some(amount) = amount else { continue };
        if amount.is_zero() {
            continue;
        }

        transfers.push(Transfer {
            hash: tx.signature.clone(),
            kind,
            timestamp,
            symbol: symbol.clone(),
            chain: Blockchain::Solana,
            amount,
            value_usd: None,
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    for t in &tx.native_transfers {
        let from = t.from_user_account.as_deref().unwrap_or_default();
        let to = t.to_user_account.as_deref().unwrap_or_default();
        let Some(kind) = transfer_kind(wallet, from, to, is_swap) else {
            continue;
        };

        let Some(amount) =
            scale_base_units(t.amount as i128, Blockchain::Solana.native_decimals())
        else {
            continue;
        };
        if amount.is_zero() {
            continue;
        }

        transfers.push(Transfer {
            hash: tx.signature.clone(),
            kind,
            timestamp,
            symbol: "SOL".into(),
            chain: Blockchain::Solana,
            amount,
            value_usd: None,
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    transfers
}

fn transfer_kind(wallet: &str, from: &str, to: &str, is_swap: bool) -> Option<TransactionKind> {
    let is_sender = from.eq_ignore_ascii_case(wallet);
    let is_recipient = to.eq_ignore_ascii_case(wallet);

    match (is_sender, is_recipient) {
        (true, true) => None,
        (true, false) if is_swap => Some(TransactionKind::Swap),
        (true, false) => Some(TransactionKind::Send),
        (false, true) if is_swap => Some(TransactionKind::Swap),
        (false, true) => Some(TransactionKind::Receive),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::solana_client::{
        RawTokenAmount, SolNativeTransfer, SolTokenTransfer, TokenInfo,
    };
    use rust_decimal::Decimal;

    fn fungible_asset(id: &str, symbol: &str, decimals: u32, balance: u128) -> Asset {
        Asset {
            id: id.into(),
            interface: "FungibleToken".into(),
            content: None,
            grouping: vec![],
            token_info: Some(TokenInfo {
                symbol: Some(symbol.into()),
                decimals: Some(decimals),
                balance: Some(balance),
            }),
        }
    }

    #[test]
    fn test_fungible_scaled_by_token_decimals() {
        let token = normalize_fungible(&fungible_asset("mint1", "JUP", 6, 1_500_000)).unwrap();
        assert_eq!(token.amount, Decimal::new(15, 1));
        assert_eq!(token.chain, Blockchain::Solana);
    }

    #[test]
    fn test_fungible_without_decimals_is_dropped() {
        let mut asset = fungible_asset("mint1", "JUP", 6, 1_500_000);
        asset.token_info.as_mut().unwrap().decimals = None;
        assert!(normalize_fungible(&asset).is_none());
    }

    #[test]
    fn test_token_transfer_uses_metadata_map() {
        let mut mints = MintMetadata::new();
        mints.insert("mint1".into(), ("JUP".into(), 6));

        let tx = EnrichedTransaction {
            signature: "sig1".into(),
            timestamp: 1_700_000_000,
            tx_type: Some("TRANSFER".into()),
            token_transfers: vec![SolTokenTransfer {
                from_user_account: Some("me".into()),
                to_user_account: Some("them".into()),
                mint: "mint1".into(),
                token_amount: None,
                raw_token_amount: Some(RawTokenAmount {
                    token_amount: "2000000".into(),
                    decimals: None,
                }),
            }],
            native_transfers: vec![],
        };

        let transfers = normalize_transaction("me", &tx, &mints);
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].amount, Decimal::TWO);
        assert_eq!(transfers[0].symbol, "JUP");
        assert_eq!(transfers[0].kind, TransactionKind::Send);
    }

    #[test]
    fn test_unknown_mint_is_dropped() {
        let mints = MintMetadata::new();
        let tx = EnrichedTransaction {
            signature: "sig1".into(),
            timestamp: 1_700_000_000,
            tx_type: None,
            token_transfers: vec![SolTokenTransfer {
                from_user_account: Some("me".into()),
                to_user_account: Some("them".into()),
                mint: "mystery-mint".into(),
                token_amount: Some(Decimal::ONE),
                raw_token_amount: None,
            }],
            native_transfers: vec![],
        };
        assert!(normalize_transaction("me", &tx, &mints).is_empty());
    }

    #[test]
    fn test_swap_type_maps_to_swap_kind() {
        let mints = MintMetadata::new();
        let tx = EnrichedTransaction {
            signature: "sig1".into(),
            timestamp: 1_700_000_000,
            tx_type: Some("SWAP".into()),
            token_transfers: vec![],
            native_transfers: vec![SolNativeTransfer {
                from_user_account: Some("me".into()),
                to_user_account: Some("pool".into()),
                amount: 1_000_000_000,
            }],
        };
        let transfers = normalize_transaction("me", &tx, &mints);
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].kind, TransactionKind::Swap);
        assert_eq!(transfers[0].amount, Decimal::ONE);
    }
}
