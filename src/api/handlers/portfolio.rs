use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::ApiResponse;
use crate::aggregator::compute_portfolio_value;
use crate::errors::AppError;
use crate::models::{PortfolioSnapshot, Wallet};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PortfolioRequest {
    pub wallets: Vec<Wallet>,
}

/// Aggregate the supplied wallets into a full portfolio snapshot.
///
/// An empty wallet list yields an empty snapshot, not an error; provider
/// failures degrade to partial data inside the aggregator.
pub async fn snapshot(
    State(state): State<AppState>,
    Json(request): Json<PortfolioRequest>,
) -> Result<Json<ApiResponse<PortfolioSnapshot>>, AppError> {
    let assets = state.aggregator.aggregate(&request.wallets).await;
    let value = compute_portfolio_value(&assets.tokens, &assets.defi_positions);

    Ok(Json(ApiResponse::ok(PortfolioSnapshot {
        tokens: assets.tokens,
        nfts: assets.nfts,
        transactions: assets.transactions,
        defi_positions: assets.defi_positions,
        value,
    })))
}
