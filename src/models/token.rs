use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Blockchain;

/// A price-less token holding as reported by a chain adapter.
///
/// Merge identity is (symbol lowercased, chain); the orchestrator sums
/// amounts across providers and wallets sharing that key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub name: String,
    pub chain: Blockchain,
    pub amount: Decimal,
}

impl TokenBalance {
    /// Key used to merge balances of the same asset on the same chain.
    pub fn merge_key(&self) -> (String, Blockchain) {
        (self.symbol.to_lowercase(), self.chain)
    }
}

/// A fungible holding with USD pricing attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub name: String,
    pub chain: Blockchain,
    pub amount: Decimal,
    pub price: Decimal,
    /// Always `amount * price` — never stored independently.
    pub value: Decimal,
    /// 24h price change in percent, as reported by the price oracle.
    pub change_24h: Decimal,
}

impl Token {
    /// Finalize a balance with oracle pricing. `value` is derived here so
    /// the `value == amount * price` invariant cannot drift.
    pub fn from_balance(balance: TokenBalance, price: Decimal, change_24h: Decimal) -> Self {
        let value = balance.amount * price;
        Self {
            symbol: balance.symbol,
            name: balance.name,
            chain: balance.chain,
            amount: balance.amount,
            price,
            value,
            change_24h,
        }
    }
}
