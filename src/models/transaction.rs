use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Blockchain;

// ---------------------------------------------------------------------------
// TransactionKind
// ---------------------------------------------------------------------------

/// Direction of a transfer relative to the queried wallet. `Swap` is
/// inferred from provider metadata where available, never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Send,
    Receive,
    Swap,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Send => write!(f, "send"),
            TransactionKind::Receive => write!(f, "receive"),
            TransactionKind::Swap => write!(f, "swap"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transfer (adapter output, price-less) / Transaction (finalized)
// ---------------------------------------------------------------------------

/// A normalized on-chain event as produced by a chain adapter.
///
/// `value_usd` is only set when the provider supplied it directly; the
/// orchestrator fills the gap from oracle prices during finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub hash: String,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub chain: Blockchain,
    pub amount: Decimal,
    #[serde(default)]
    pub value_usd: Option<Decimal>,
    pub from: String,
    pub to: String,
}

/// A historical on-chain event with its USD value resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub chain: Blockchain,
    pub amount: Decimal,
    /// Provider-supplied value when available, otherwise `amount * price`
    /// from the oracle, otherwise 0 — a missing price never blocks.
    pub value_usd: Decimal,
    pub from: String,
    pub to: String,
}

impl Transaction {
    pub fn from_transfer(transfer: Transfer, resolved_value: Decimal) -> Self {
        Self {
            hash: transfer.hash,
            kind: transfer.kind,
            timestamp: transfer.timestamp,
            symbol: transfer.symbol,
            chain: transfer.chain,
            amount: transfer.amount,
            value_usd: transfer.value_usd.unwrap_or(resolved_value),
            from: transfer.from,
            to: transfer.to,
        }
    }
}
