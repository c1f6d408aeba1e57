use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Blockchain;

// ---------------------------------------------------------------------------
// DefiPositionKind
// ---------------------------------------------------------------------------

/// Canonical DeFi position categories. Provider category labels outside the
/// four known ones map to `Other` rather than being mislabeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefiPositionKind {
    Staking,
    Lending,
    LiquidityPool,
    Farming,
    Other,
}

impl DefiPositionKind {
    /// Map a provider category label onto a canonical kind.
    pub fn from_provider_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "staking" | "staked" | "stake" => DefiPositionKind::Staking,
            "lending" | "supplied" | "deposit" | "deposits" => DefiPositionKind::Lending,
            "liquidity" | "liquidity_pool" | "liquidity pool" | "lp" | "pool" => {
                DefiPositionKind::LiquidityPool
            }
            "farming" | "yield" | "yield_farming" | "farm" => DefiPositionKind::Farming,
            _ => DefiPositionKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DefiPositionKind::Staking => "staking",
            DefiPositionKind::Lending => "lending",
            DefiPositionKind::LiquidityPool => "liquidity_pool",
            DefiPositionKind::Farming => "farming",
            DefiPositionKind::Other => "other",
        }
    }
}

impl fmt::Display for DefiPositionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DefiPosition
// ---------------------------------------------------------------------------

/// Per-asset breakdown within a position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefiAsset {
    pub symbol: String,
    pub amount: Decimal,
    pub value_usd: Decimal,
}

/// A staking/lending/LP/farming position. Only the EVM adapter produces
/// these — a provider capability gap, surfaced via `ChainAdapter::supports_defi`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefiPosition {
    pub platform: String,
    #[serde(default)]
    pub platform_logo: Option<String>,
    pub kind: DefiPositionKind,
    pub assets: Vec<DefiAsset>,
    pub value_usd: Decimal,
    #[serde(default)]
    pub apy: Option<Decimal>,
    #[serde(default)]
    pub rewards_usd: Option<Decimal>,
    pub chain: Blockchain,
    #[serde(default)]
    pub manage_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels_map_to_kinds() {
        assert_eq!(
            DefiPositionKind::from_provider_label("Staking"),
            DefiPositionKind::Staking
        );
        assert_eq!(
            DefiPositionKind::from_provider_label("supplied"),
            DefiPositionKind::Lending
        );
        assert_eq!(
            DefiPositionKind::from_provider_label("liquidity pool"),
            DefiPositionKind::LiquidityPool
        );
        assert_eq!(
            DefiPositionKind::from_provider_label("yield"),
            DefiPositionKind::Farming
        );
    }

    #[test]
    fn test_unrecognized_label_maps_to_other() {
        assert_eq!(
            DefiPositionKind::from_provider_label("perpetuals"),
            DefiPositionKind::Other
        );
    }
}
