pub mod alert;
pub mod defi;
pub mod nft;
pub mod snapshot;
pub mod token;
pub mod transaction;

pub use alert::WhaleAlert;
pub use defi::{DefiAsset, DefiPosition, DefiPositionKind};
pub use nft::Nft;
pub use snapshot::{PortfolioSnapshot, PortfolioValue};
pub use token::{Token, TokenBalance};
pub use transaction::{Transaction, TransactionKind, Transfer};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Blockchain
// ---------------------------------------------------------------------------

/// Supported blockchains. EVM-compatible chains share one adapter;
/// Solana and Bitcoin each have their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blockchain {
    Ethereum,
    Polygon,
    Bsc,
    Arbitrum,
    Optimism,
    Base,
    Avalanche,
    Solana,
    Bitcoin,
}

/// Adapter grouping by blockchain technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Evm,
    Solana,
    Bitcoin,
}

impl Blockchain {
    pub fn family(&self) -> ChainFamily {
        match self {
            Blockchain::Solana => ChainFamily::Solana,
            Blockchain::Bitcoin => ChainFamily::Bitcoin,
            _ => ChainFamily::Evm,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Blockchain::Ethereum => "ethereum",
            Blockchain::Polygon => "polygon",
            Blockchain::Bsc => "bsc",
            Blockchain::Arbitrum => "arbitrum",
            Blockchain::Optimism => "optimism",
            Blockchain::Base => "base",
            Blockchain::Avalanche => "avalanche",
            Blockchain::Solana => "solana",
            Blockchain::Bitcoin => "bitcoin",
        }
    }

    /// The base currency of the chain (as opposed to deployed token assets).
    pub fn native_symbol(&self) -> &'static str {
        match self {
            Blockchain::Ethereum
            | Blockchain::Arbitrum
            | Blockchain::Optimism
            | Blockchain::Base => "ETH",
            Blockchain::Polygon => "MATIC",
            Blockchain::Bsc => "BNB",
            Blockchain::Avalanche => "AVAX",
            Blockchain::Solana => "SOL",
            Blockchain::Bitcoin => "BTC",
        }
    }

    /// Decimals of the native asset's smallest unit (wei, lamports, satoshis).
    pub fn native_decimals(&self) -> u32 {
        match self.family() {
            ChainFamily::Evm => 18,
            ChainFamily::Solana => 9,
            ChainFamily::Bitcoin => 8,
        }
    }

    /// Chain slug for the EVM data provider's `chain` query parameter.
    /// `None` for non-EVM chains.
    pub fn evm_slug(&self) -> Option<&'static str> {
        match self {
            Blockchain::Ethereum => Some("eth"),
            Blockchain::Polygon => Some("polygon"),
            Blockchain::Bsc => Some("bsc"),
            Blockchain::Arbitrum => Some("arbitrum"),
            Blockchain::Optimism => Some("optimism"),
            Blockchain::Base => Some("base"),
            Blockchain::Avalanche => Some("avalanche"),
            Blockchain::Solana | Blockchain::Bitcoin => None,
        }
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Blockchain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ethereum" | "eth" => Ok(Blockchain::Ethereum),
            "polygon" | "matic" => Ok(Blockchain::Polygon),
            "bsc" | "binance" => Ok(Blockchain::Bsc),
            "arbitrum" => Ok(Blockchain::Arbitrum),
            "optimism" => Ok(Blockchain::Optimism),
            "base" => Ok(Blockchain::Base),
            "avalanche" | "avax" => Ok(Blockchain::Avalanche),
            "solana" | "sol" => Ok(Blockchain::Solana),
            "bitcoin" | "btc" => Ok(Blockchain::Bitcoin),
            other => Err(format!("unknown blockchain: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// One address on one blockchain. Users, whales, and segment members are
/// all represented identically at the aggregation boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub address: String,
    pub blockchain: Blockchain,
    #[serde(default)]
    pub nickname: Option<String>,
}

impl Wallet {
    pub fn new(address: impl Into<String>, blockchain: Blockchain) -> Self {
        Self {
            address: address.into(),
            blockchain,
            nickname: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evm_chains_share_family() {
        assert_eq!(Blockchain::Ethereum.family(), ChainFamily::Evm);
        assert_eq!(Blockchain::Base.family(), ChainFamily::Evm);
        assert_eq!(Blockchain::Solana.family(), ChainFamily::Solana);
        assert_eq!(Blockchain::Bitcoin.family(), ChainFamily::Bitcoin);
    }

    #[test]
    fn test_native_decimals() {
        assert_eq!(Blockchain::Polygon.native_decimals(), 18);
        assert_eq!(Blockchain::Solana.native_decimals(), 9);
        assert_eq!(Blockchain::Bitcoin.native_decimals(), 8);
    }

    #[test]
    fn test_from_str_aliases() {
        assert_eq!("eth".parse::<Blockchain>().unwrap(), Blockchain::Ethereum);
        assert_eq!("SOL".parse::<Blockchain>().unwrap(), Blockchain::Solana);
        assert!("dogecoin".parse::<Blockchain>().is_err());
    }
}
