use serde::{Deserialize, Serialize};

use crate::aggregator::{compute_portfolio_value, AggregatedAssets, Aggregator};
use crate::models::{Blockchain, PortfolioValue, Wallet};

/// Aggregated holdings for a single tracked whale address.
///
/// The whale is wrapped in one synthetic wallet and run through the normal
/// aggregation pipeline; the output is display-ready with no further
/// processing.
pub async fn whale_portfolio(
    aggregator: &Aggregator,
    address: &str,
    blockchain: Blockchain,
) -> AggregatedAssets {
    let wallet = Wallet::new(address, blockchain);
    aggregator.aggregate(std::slice::from_ref(&wallet)).await
}

/// Combined view over all member wallets of a whale segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentPortfolio {
    pub assets: AggregatedAssets,
    /// Aggregate value across the whole segment, same formula as a single
    /// portfolio.
    pub value: PortfolioValue,
}

/// Aggregate a whale segment: one synthetic wallet per member address,
/// merged through the normal pipeline, plus the segment-wide value summary.
pub async fn segment_portfolio(aggregator: &Aggregator, members: &[Wallet]) -> SegmentPortfolio {
    let assets = aggregator.aggregate(members).await;
    let value = compute_portfolio_value(&assets.tokens, &assets.defi_positions);

    SegmentPortfolio { assets, value }
}
