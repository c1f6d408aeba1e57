use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::Wallet;
use crate::services::whale_view::{self, SegmentPortfolio};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SegmentRequest {
    /// One entry per member address of the segment.
    pub members: Vec<Wallet>,
}

/// Segment view: merged holdings across all member wallets plus the
/// segment-wide aggregate value.
pub async fn portfolio(
    State(state): State<AppState>,
    Json(request): Json<SegmentRequest>,
) -> Result<Json<ApiResponse<SegmentPortfolio>>, AppError> {
    let segment = whale_view::segment_portfolio(&state.aggregator, &request.members).await;
    Ok(Json(ApiResponse::ok(segment)))
}
