use axum::extract::{Path, State};
use axum::Json;

use super::ApiResponse;
use crate::aggregator::AggregatedAssets;
use crate::errors::AppError;
use crate::models::Blockchain;
use crate::services::whale_view;
use crate::AppState;

/// Single-whale view: one synthetic wallet for the tracked address.
pub async fn portfolio(
    State(state): State<AppState>,
    Path((chain, address)): Path<(String, String)>,
) -> Result<Json<ApiResponse<AggregatedAssets>>, AppError> {
    let blockchain: Blockchain = chain
        .parse()
        .map_err(AppError::BadRequest)?;

    let assets = whale_view::whale_portfolio(&state.aggregator, &address, blockchain).await;
    Ok(Json(ApiResponse::ok(assets)))
}
