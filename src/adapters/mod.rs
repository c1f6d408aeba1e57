pub mod bitcoin;
pub mod evm;
pub mod solana;

pub use bitcoin::BitcoinAdapter;
pub use evm::EvmAdapter;
pub use solana::SolanaAdapter;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{ChainFamily, DefiPosition, Nft, TokenBalance, Transfer, Wallet};

const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// Shown for NFTs whose image metadata is missing or unusable.
pub const PLACEHOLDER_IMAGE: &str =
    "https://placehold.co/300x300/1a1a2e/ffffff?text=NFT";

// ---------------------------------------------------------------------------
// ChainAdapter
// ---------------------------------------------------------------------------

/// The four partial (price-less) lists one chain family contributes.
#[derive(Debug, Clone, Default)]
pub struct ChainFetch {
    pub tokens: Vec<TokenBalance>,
    pub nfts: Vec<Nft>,
    pub transfers: Vec<Transfer>,
    pub defi_positions: Vec<DefiPosition>,
}

impl ChainFetch {
    pub fn extend(&mut self, other: ChainFetch) {
        self.tokens.extend(other.tokens);
        self.nfts.extend(other.nfts);
        self.transfers.extend(other.transfers);
        self.defi_positions.extend(other.defi_positions);
    }
}

/// Fetches raw balances, NFTs, and transaction history for a batch of
/// wallets on one blockchain family and normalizes them into partial domain
/// records. Wallets are processed independently; one wallet failing must not
/// abort the others.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    fn family(&self) -> ChainFamily;

    /// Whether this adapter's provider exposes DeFi positions. A capability
    /// gap, not an error: callers should not infer it from empty lists.
    fn supports_defi(&self) -> bool {
        false
    }

    async fn fetch(&self, wallets: &[Wallet]) -> anyhow::Result<ChainFetch>;
}

// ---------------------------------------------------------------------------
// Shared normalization helpers
// ---------------------------------------------------------------------------

/// Scale a raw smallest-unit balance (wei, lamports, satoshis, token base
/// units) down by `10^decimals`.
///
/// Returns `None` when the raw string or decimals are unusable — the caller
/// must drop the record rather than guess, since wrong decimals silently
/// corrupt every downstream USD value.
pub fn scale_raw_amount(raw: &str, decimals: u32) -> Option<Decimal> {
    let units = raw.trim().parse::<i128>().ok()?;
    scale_base_units(units, decimals)
}

pub fn scale_base_units(units: i128, decimals: u32) -> Option<Decimal> {
    if units < 0 {
        return None;
    }
    Decimal::try_from_i128_with_scale(units, decimals).ok()
}

/// Rewrite an `ipfs://` URI to an HTTP gateway URL; other URLs pass through.
pub fn rewrite_ipfs(url: &str) -> String {
    match url.strip_prefix("ipfs://") {
        Some(path) => format!("{}{}", IPFS_GATEWAY, path.trim_start_matches("ipfs/")),
        None => url.to_string(),
    }
}

/// Resolve an optional image URL: IPFS URIs are rewritten, anything missing
/// or empty becomes the fixed placeholder. Never returns an empty string.
pub fn resolve_image_url(url: Option<&str>) -> String {
    match url {
        Some(u) if !u.trim().is_empty() => rewrite_ipfs(u),
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_wei_to_whole_token() {
        let amount = scale_raw_amount("1000000000000000000", 18).unwrap();
        assert_eq!(amount, Decimal::ONE);
    }

    #[test]
    fn test_scale_fractional() {
        let amount = scale_raw_amount("1500000", 6).unwrap();
        assert_eq!(amount, Decimal::new(15, 1)); // 1.5
    }

    #[test]
    fn test_scale_rejects_garbage() {
        assert!(scale_raw_amount("not-a-number", 18).is_none());
        assert!(scale_raw_amount("", 18).is_none());
        assert!(scale_raw_amount("-5", 18).is_none());
    }

    #[test]
    fn test_scale_rejects_absurd_decimals() {
        // Decimal supports at most 28 fractional digits.
        assert!(scale_raw_amount("1000", 40).is_none());
    }

    #[test]
    fn test_ipfs_rewrite() {
        assert_eq!(
            rewrite_ipfs("ipfs://abc123"),
            "https://ipfs.io/ipfs/abc123"
        );
        assert_eq!(
            rewrite_ipfs("https://cdn.example/x.png"),
            "https://cdn.example/x.png"
        );
    }

    #[test]
    fn test_missing_image_gets_placeholder() {
        assert_eq!(resolve_image_url(None), PLACEHOLDER_IMAGE);
        assert_eq!(resolve_image_url(Some("")), PLACEHOLDER_IMAGE);
        assert_eq!(resolve_image_url(Some("   ")), PLACEHOLDER_IMAGE);
        assert_eq!(
            resolve_image_url(Some("ipfs://abc123")),
            "https://ipfs.io/ipfs/abc123"
        );
    }
}
