use metrics::counter;
use rust_decimal::Decimal;

use crate::aggregator::Aggregator;
use crate::models::{Transaction, Wallet, WhaleAlert};

/// Run the aggregation pipeline over all tracked whale wallets and keep
/// only transactions whose USD value exceeds the significance threshold.
///
/// Each qualifying transaction is associated back to its originating whale
/// by matching from/to against the tracked addresses (case-insensitive) and
/// wrapped into an unread alert. Read-state persistence is the caller's
/// concern.
pub async fn significant_transfers(
    aggregator: &Aggregator,
    whales: &[Wallet],
    min_value_usd: Decimal,
) -> Vec<WhaleAlert> {
    if whales.is_empty() {
        return Vec::new();
    }

    let assets = aggregator.aggregate(whales).await;

    let alerts: Vec<WhaleAlert> = assets
        .transactions
        .into_iter()
        .filter(|tx| tx.value_usd > min_value_usd)
        .filter_map(|tx| {
            let whale = match_whale(whales, &tx)?;
            Some(WhaleAlert::new(whale, tx))
        })
        .collect();

    if !alerts.is_empty() {
        counter!("alerts_emitted_total").increment(alerts.len() as u64);
        tracing::info!(
            alerts = alerts.len(),
            min_value_usd = %min_value_usd,
            "Significant whale transactions detected"
        );
    }

    alerts
}

/// The tracked address this transaction belongs to. Sender side wins when
/// both sides are tracked whales.
fn match_whale(whales: &[Wallet], tx: &Transaction) -> Option<String> {
    let by_address = |addr: &str| {
        whales
            .iter()
            .find(|w| w.address.eq_ignore_ascii_case(addr))
            .map(|w| w.address.clone())
    };

    by_address(&tx.from).or_else(|| by_address(&tx.to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Blockchain, TransactionKind};
    use chrono::Utc;

    fn tx(from: &str, to: &str, value: i64) -> Transaction {
        Transaction {
            hash: "0xh".into(),
            kind: TransactionKind::Send,
            timestamp: Utc::now(),
            symbol: "ETH".into(),
            chain: Blockchain::Ethereum,
            amount: Decimal::ONE,
            value_usd: Decimal::from(value),
            from: from.into(),
            to: to.into(),
        }
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let whales = vec![Wallet::new("0xAbCd", Blockchain::Ethereum)];
        let matched = match_whale(&whales, &tx("0xabcd", "0xother", 1)).unwrap();
        assert_eq!(matched, "0xAbCd");
    }

    #[test]
    fn test_sender_side_wins_over_recipient() {
        let whales = vec![
            Wallet::new("0xsender", Blockchain::Ethereum),
            Wallet::new("0xrecipient", Blockchain::Ethereum),
        ];
        let matched = match_whale(&whales, &tx("0xSENDER", "0xrecipient", 1)).unwrap();
        assert_eq!(matched, "0xsender");
    }

    #[test]
    fn test_unmatched_transaction_has_no_whale() {
        let whales = vec![Wallet::new("0xwhale", Blockchain::Ethereum)];
        assert!(match_whale(&whales, &tx("0xa", "0xb", 1)).is_none());
    }
}
