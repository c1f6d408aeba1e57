use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DefiPosition, Nft, Token, Transaction};

/// Aggregate USD value summary for a wallet set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioValue {
    /// `Σ token.value + Σ defi_position.value_usd`.
    pub total: Decimal,
    /// Absolute USD change over the last 24 hours.
    pub change_24h: Decimal,
    /// `change_24h / (total - change_24h) * 100`, or 0 when the growth
    /// base is 0.
    pub change_24h_percent: Decimal,
}

impl PortfolioValue {
    pub fn zero() -> Self {
        Self {
            total: Decimal::ZERO,
            change_24h: Decimal::ZERO,
            change_24h_percent: Decimal::ZERO,
        }
    }
}

/// The complete point-in-time aggregation result for a wallet set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub tokens: Vec<Token>,
    pub nfts: Vec<Nft>,
    /// Newest first, capped at 100.
    pub transactions: Vec<Transaction>,
    pub defi_positions: Vec<DefiPosition>,
    pub value: PortfolioValue,
}
